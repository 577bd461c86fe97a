//! The common contract every prover implements, so the coordinator can
//! dispatch to any of them uniformly.

use std::collections::{BTreeSet, HashMap};

use crate::ast::AstId;
use crate::ast::AstStore;
use crate::proof::ProofObject;

/// Caps on the resources a single proof attempt may consume.
///
/// Mirrors the shape of the original system's resource-limit object:
/// a handful of named limits plus an open bag (`additional`) for
/// prover-specific knobs (e.g. the CLP module's `max_solutions`, the SMT
/// bridge's `logic_theory`).
#[derive(Debug, Clone, Default)]
pub struct ResourceLimits {
    pub time_limit_ms: Option<u64>,
    pub depth_limit: Option<usize>,
    pub nodes_limit: Option<usize>,
    pub additional: HashMap<String, String>,
}

impl ResourceLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn with_depth_limit(mut self, depth: usize) -> Self {
        self.depth_limit = Some(depth);
        self
    }

    pub fn with_nodes_limit(mut self, nodes: usize) -> Self {
        self.nodes_limit = Some(nodes);
        self
    }

    pub fn with_additional(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional.insert(key.into(), value.into());
        self
    }

    /// Reads an additional, prover-specific limit by key.
    pub fn get_additional(&self, key: &str) -> Option<&str> {
        self.additional.get(key).map(|s| s.as_str())
    }
}

/// The interface every prover implements.
///
/// `prove` is the only method that does real work; `can_handle` lets the
/// coordinator's dispatch table (and an explicit `strategy_hint`) ask a
/// prover whether it is a plausible fit before committing to it.
pub trait Prover {
    /// Attempts to prove `goal` given `context`, honoring `resources`.
    ///
    /// `store` is the shared hash-consing arena: provers read existing
    /// nodes from it and intern whatever new nodes their search needs
    /// (renamed variables, Skolem functions, resolvents, ...). AST nodes
    /// are immutable and freely shared, so handing out `&mut AstStore`
    /// per call is safe — proof attempts never run concurrently against
    /// the same store.
    fn prove(&self, store: &mut AstStore, goal: AstId, context: &BTreeSet<AstId>, resources: &ResourceLimits) -> ProofObject;

    /// Whether this prover is a plausible fit for `goal`/`context`.
    ///
    /// This is a syntactic pre-filter, not a guarantee of success: a
    /// prover that returns `true` here may still fail to prove the goal.
    fn can_handle(&self, store: &AstStore, goal: AstId, context: &BTreeSet<AstId>) -> bool;

    /// A stable, human-readable name identifying this prover, used in
    /// `ProofObject::engine` and in dispatch-rule matching.
    fn name(&self) -> &str;

    /// Capability flags describing what this prover is built to reason
    /// about. Defaults to all-`false`; implementations override the
    /// subset they actually support.
    fn capabilities(&self) -> HashMap<&'static str, bool> {
        [
            ("first_order_logic", false),
            ("propositional_logic", false),
            ("modal_logic", false),
            ("arithmetic", false),
            ("equality", false),
            ("constraint_solving", false),
            ("analogical_reasoning", false),
        ]
        .into_iter()
        .collect()
    }
}
