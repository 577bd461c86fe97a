use std::fmt;

/// Errors the analogical engine can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalogyError {
    /// Neither domain yielded any objects, predicates, or relations.
    EmptyDomain,
    /// No candidate mapping scored above zero.
    NoMappingFound,
    /// `project` was asked to walk a symbol absent from the mapping.
    UnmappedSymbol(String),
}

impl fmt::Display for AnalogyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalogyError::EmptyDomain => write!(f, "source or target domain has no ground relations"),
            AnalogyError::NoMappingFound => write!(f, "No analogical mappings found"),
            AnalogyError::UnmappedSymbol(name) => write!(f, "unmapped symbol: {}", name),
        }
    }
}

impl std::error::Error for AnalogyError {}
