//! The uniform result value returned by every prover.

use std::collections::{BTreeMap, BTreeSet};

use crate::ast::{AstId, VarId};

/// A single step of a reconstructed derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofStep {
    /// The formula derived at this step.
    pub formula: AstId,
    /// The inference rule used, e.g. `"Resolution"` or `"ModusPonens"`.
    pub rule_name: String,
    /// Indices into the owning proof's step list for the premises this
    /// step was derived from.
    pub premises: Vec<usize>,
    /// A human-readable explanation, empty when none is warranted.
    pub explanation: String,
}

impl ProofStep {
    pub fn new(formula: AstId, rule_name: impl Into<String>, premises: Vec<usize>) -> Self {
        ProofStep {
            formula,
            rule_name: rule_name.into(),
            premises,
            explanation: String::new(),
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }
}

/// The outcome of a single proof attempt, returned by every prover
/// behind a uniform interface.
///
/// `achieved` is the only field callers must check before trusting the
/// rest; every other field is populated (or left at its zero value) per
/// whether the attempt succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofObject {
    pub achieved: bool,
    /// The proven goal or derived expression, present on success.
    pub conclusion: Option<AstId>,
    /// Variable bindings found for a "find" style goal.
    pub bindings: Option<BTreeMap<VarId, AstId>>,
    /// e.g. `"Proved"`, `"Failed: Timeout"`, `"Contradiction Found"`.
    pub status: String,
    pub steps: Vec<ProofStep>,
    /// The premises that were actually load-bearing for this proof.
    pub used_premises: BTreeSet<AstId>,
    /// Name of the prover that produced this object.
    pub engine: String,
    pub time_ms: u64,
    /// Resource counters consumed during the attempt, e.g.
    /// `{"nodes_explored": 1000.0}`.
    pub resources: BTreeMap<String, f64>,
}

impl ProofObject {
    #[allow(clippy::too_many_arguments)]
    pub fn success(
        conclusion: AstId,
        bindings: Option<BTreeMap<VarId, AstId>>,
        steps: Vec<ProofStep>,
        used_premises: BTreeSet<AstId>,
        engine: impl Into<String>,
        time_ms: u64,
        resources: BTreeMap<String, f64>,
    ) -> Self {
        ProofObject {
            achieved: true,
            conclusion: Some(conclusion),
            bindings,
            status: "Proved".to_string(),
            steps,
            used_premises,
            engine: engine.into(),
            time_ms,
            resources,
        }
    }

    pub fn failure(
        status: impl Into<String>,
        engine: impl Into<String>,
        time_ms: u64,
        resources: BTreeMap<String, f64>,
    ) -> Self {
        ProofObject {
            achieved: false,
            conclusion: None,
            bindings: None,
            status: status.into(),
            steps: Vec::new(),
            used_premises: BTreeSet::new(),
            engine: engine.into(),
            time_ms,
            resources,
        }
    }

    /// Returns a copy of this object with updated timing and resource
    /// counters, leaving the proof content untouched.
    ///
    /// Used by the coordinator to stamp wall-clock time and resource
    /// usage measured outside the prover itself.
    pub fn with_time_and_resources(&self, time_ms: u64, resources: BTreeMap<String, f64>) -> Self {
        ProofObject {
            time_ms,
            resources,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_has_no_conclusion_or_bindings() {
        let obj = ProofObject::failure("Failed: Timeout", "resolution", 12, BTreeMap::new());
        assert!(!obj.achieved);
        assert!(obj.conclusion.is_none());
        assert!(obj.bindings.is_none());
        assert_eq!(obj.status, "Failed: Timeout");
    }

    #[test]
    fn with_time_and_resources_preserves_proof_content() {
        let mut resources = BTreeMap::new();
        resources.insert("nodes_explored".to_string(), 3.0);
        let original = ProofObject::failure("Failed: Timeout", "resolution", 5, BTreeMap::new());
        let updated = original.with_time_and_resources(42, resources.clone());
        assert_eq!(updated.time_ms, 42);
        assert_eq!(updated.resources, resources);
        assert_eq!(updated.status, original.status);
    }
}
