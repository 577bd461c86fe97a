use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClpError {
    MaxDepth,
    TimeLimit,
    MaxSolutions,
}

impl fmt::Display for ClpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClpError::MaxDepth => write!(f, "max resolution depth reached"),
            ClpError::TimeLimit => write!(f, "time limit reached"),
            ClpError::MaxSolutions => write!(f, "max solutions reached"),
        }
    }
}

impl std::error::Error for ClpError {}
