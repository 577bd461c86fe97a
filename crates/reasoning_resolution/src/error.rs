use std::fmt;

/// Errors the resolution prover can report.
///
/// There is no `Error::from` blanket impl into this type: callers at the
/// coordinator boundary convert a `ResolutionError` into a failed
/// `ProofObject` explicitly (see `reasoning-coordinator`), matching how
/// the rest of this codebase treats per-crate errors as values rather
/// than routing everything through one shared error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The agenda was exhausted without deriving the empty clause.
    AgendaExhausted,
    /// `max_steps` resolution steps were performed without success.
    MaxIterations,
    /// `max_time_ms` elapsed without success.
    TimeLimit,
    /// A construct the CNF pipeline does not support appeared in the goal
    /// or context (e.g. a modal operator reaching the resolution prover
    /// directly rather than through the coordinator).
    UnsupportedConstruct(String),
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionError::AgendaExhausted => write!(f, "agenda exhausted without refutation"),
            ResolutionError::MaxIterations => write!(f, "max iterations"),
            ResolutionError::TimeLimit => write!(f, "time limit"),
            ResolutionError::UnsupportedConstruct(what) => {
                write!(f, "unsupported construct: {}", what)
            }
        }
    }
}

impl std::error::Error for ResolutionError {}
