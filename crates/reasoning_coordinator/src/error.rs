use std::fmt;

/// The coordinator's own umbrella error, used only inside `submit_goal`
/// and never returned to a caller: every variant is folded into a
/// failed [`reasoning_ast::ProofObject`] before `submit_goal` returns,
/// matching the propagation policy every prover already follows: nothing
/// raises past its `prove` boundary, every failure becomes a ProofObject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    /// No dispatch rule's predicate matched, or every matching prover's
    /// `can_handle` returned false.
    NoSuitableProver,
    /// A prover panicked instead of returning a `ProofObject`.
    ProverPanicked { prover: String, message: String },
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinatorError::NoSuitableProver => write!(f, "No suitable prover found for this goal"),
            CoordinatorError::ProverPanicked { prover, message } => {
                write!(f, "Error: prover {} failed: {}", prover, message)
            }
        }
    }
}

impl std::error::Error for CoordinatorError {}
