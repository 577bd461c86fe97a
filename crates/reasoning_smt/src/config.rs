//! Configuration for an external SMT solver executable.

/// Names, locates, and parameterizes one SMT-LIB 2 solver.
///
/// Mirrors the reference's `SMTSolverConfiguration`: a prover can be
/// configured with several of these (e.g. Z3 and CVC5), and a goal's
/// `resources["solver_name"]` selects among them at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtSolverConfig {
    pub name: String,
    pub path: String,
    pub options: Vec<String>,
}

impl SmtSolverConfig {
    pub fn new(name: impl Into<String>, path: impl Into<String>, options: Vec<String>) -> Self {
        SmtSolverConfig {
            name: name.into(),
            path: path.into(),
            options,
        }
    }

    /// Z3 invoked as `z3 -smt2 <path>`, assuming `z3` is on `PATH`.
    pub fn z3() -> Self {
        SmtSolverConfig::new("Z3", "z3", vec!["-smt2".to_string()])
    }

    /// The full command line to run this solver against a script at `script_path`.
    pub fn command(&self, script_path: &str) -> (String, Vec<String>) {
        let mut args = self.options.clone();
        args.push(script_path.to_string());
        (self.path.clone(), args)
    }
}
