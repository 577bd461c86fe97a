use std::fmt;

/// Errors the SMT bridge can report.
///
/// There is no `Error::from` blanket impl into this type: callers at the
/// coordinator boundary convert a `SmtError` into a failed `ProofObject`
/// explicitly, matching [`reasoning_resolution::error::ResolutionError`]'s
/// convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtError {
    /// No solver configuration was available to invoke.
    NoSolverConfigured,
    /// `resources["solver_name"]` named a solver not present in this
    /// prover's configured list.
    UnknownSolver(String),
    /// The solver executable could not be spawned (missing binary, no
    /// permission, ...).
    SpawnFailed(String),
    /// The wall-clock deadline elapsed before the solver finished; the
    /// child process was killed.
    TimeLimit,
    /// The solver exited with a nonzero status.
    NonZeroExit(String),
    /// stdout did not start with `sat` / `unsat` / `unknown`.
    UnparseableOutput(String),
    /// A construct the translator does not support reached the bridge
    /// (e.g. a modal operator, which belongs to the tableau prover).
    UnsupportedConstruct(String),
}

impl fmt::Display for SmtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmtError::NoSolverConfigured => write!(f, "no SMT solver configured"),
            SmtError::UnknownSolver(name) => write!(f, "unknown solver: {name}"),
            SmtError::SpawnFailed(msg) => write!(f, "Error: failed to start solver: {msg}"),
            SmtError::TimeLimit => write!(f, "time limit"),
            SmtError::NonZeroExit(stderr) => write!(f, "Error: solver exited with an error: {stderr}"),
            SmtError::UnparseableOutput(line) => write!(f, "Error: unparseable solver output: {line}"),
            SmtError::UnsupportedConstruct(what) => write!(f, "unsupported construct: {what}"),
        }
    }
}

impl std::error::Error for SmtError {}
