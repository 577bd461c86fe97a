//! Parsing a solver's stdout into a structured verdict.

use crate::error::SmtError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatStatus {
    Sat,
    Unsat,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct SmtOutcome {
    pub status: SatStatus,
    /// `:named` labels returned by `(get-unsat-core)`, in the order the
    /// solver printed them.
    pub unsat_core: Vec<String>,
    /// The raw `(get-model)` S-expression, unparsed — the reference
    /// implementation leaves model parsing a placeholder, and so do we.
    pub model: Option<String>,
}

/// Parses a solver's stdout: first line is `sat | unsat | unknown`,
/// optionally followed by a model or unsat-core S-expression.
pub fn parse(stdout: &str) -> Result<SmtOutcome, SmtError> {
    let mut lines = stdout.lines();
    let first = lines.next().unwrap_or("").trim();

    let status = match first {
        "sat" => SatStatus::Sat,
        "unsat" => SatStatus::Unsat,
        "unknown" => SatStatus::Unknown,
        other => return Err(SmtError::UnparseableOutput(other.to_string())),
    };

    let rest: String = lines.collect::<Vec<_>>().join("\n");
    let mut outcome = SmtOutcome {
        status,
        unsat_core: Vec::new(),
        model: None,
    };

    match status {
        SatStatus::Unsat if !rest.trim().is_empty() => {
            outcome.unsat_core = parse_unsat_core(&rest);
        }
        SatStatus::Sat if !rest.trim().is_empty() => {
            outcome.model = Some(rest);
        }
        _ => {}
    }

    Ok(outcome)
}

/// Strips the enclosing `(get-unsat-core)` parens and returns the
/// `:named` labels they wrap, in order.
fn parse_unsat_core(body: &str) -> Vec<String> {
    body.replace(['(', ')'], " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_unsat() {
        let outcome = parse("unsat\n").unwrap();
        assert_eq!(outcome.status, SatStatus::Unsat);
        assert!(outcome.unsat_core.is_empty());
    }

    #[test]
    fn parses_unsat_core_labels() {
        let outcome = parse("unsat\n(axiom_0 formula)\n").unwrap();
        assert_eq!(outcome.unsat_core, vec!["axiom_0".to_string(), "formula".to_string()]);
    }

    #[test]
    fn rejects_unrecognized_first_line() {
        assert!(parse("error: parse error\n").is_err());
    }
}
