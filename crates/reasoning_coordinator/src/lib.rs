//! Goal classification, prover dispatch, and resource enforcement.
//!
//! [`Coordinator::submit_goal`] is the single entry point: it classifies
//! a goal against the priority-ordered rule table in [`rules`], hands
//! the goal to the selected prover, and rewrites the returned
//! [`ProofObject`]'s timing fields with its own measurement before
//! returning it unchanged otherwise.

pub mod error;
pub mod rules;

use std::collections::{BTreeMap, BTreeSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use reasoning_analogy::AnalogicalEngine;
use reasoning_ast::{AstId, AstStore, ProofObject, Prover, ResourceLimits};
use reasoning_clp::ClpProver;
use reasoning_modal::ModalTableauProver;
use reasoning_resolution::ResolutionProver;
use reasoning_smt::SmtProver;

pub use error::CoordinatorError;
use rules::DispatchRule;

/// Dispatches goals to the five reference provers.
///
/// Provers are held behind `Box<dyn Prover>` — a trait object rather
/// than a tagged-variant enum, since provers carry no shared data beyond
/// the `Prover` contract itself — keyed by [`Prover::name`], so the
/// dispatch table in [`rules::default_rules`] only needs to know prover
/// names, not their concrete types.
pub struct Coordinator {
    provers: BTreeMap<String, Box<dyn Prover>>,
    rule_table: Vec<DispatchRule>,
}

impl Coordinator {
    /// The standard coordinator: one instance of each of the five
    /// reference provers, dispatched via [`rules::default_rules`].
    ///
    /// The SMT bridge defaults to a single Z3 solver on `PATH`; swap it
    /// out with [`Coordinator::with_provers`] to point elsewhere.
    pub fn new() -> Self {
        let provers: Vec<Box<dyn Prover>> = vec![
            Box::new(ResolutionProver::new()),
            Box::new(ModalTableauProver::new()),
            Box::new(ClpProver::new()),
            Box::new(SmtProver::with_default_z3()),
            Box::new(AnalogicalEngine::new()),
        ];
        Self::with_provers(provers)
    }

    /// Builds a coordinator from an explicit set of provers, useful for
    /// tests that substitute a stub prover or omit the SMT bridge when
    /// no solver executable is available.
    pub fn with_provers(provers: Vec<Box<dyn Prover>>) -> Self {
        let mut map = BTreeMap::new();
        for prover in provers {
            map.insert(prover.name().to_string(), prover);
        }
        Coordinator {
            provers: map,
            rule_table: rules::default_rules(),
        }
    }

    /// Chooses a prover name for `goal`, honoring `strategy_hint` first.
    ///
    /// Returns `None` when no rule's predicate matches, or every
    /// matching prover's `can_handle` rejects the goal — spec §4.8's
    /// "If none match, a bare failure ... is returned".
    fn select_prover(&self, store: &AstStore, goal: AstId, context: &BTreeSet<AstId>, strategy_hint: Option<&str>) -> Option<String> {
        if let Some(hint) = strategy_hint {
            if let Some(prover) = self.provers.get(hint) {
                if prover.can_handle(store, goal, context) {
                    return Some(hint.to_string());
                }
            }
        }

        for rule in &self.rule_table {
            if !(rule.predicate)(store, goal) {
                continue;
            }
            if let Some(prover) = self.provers.get(rule.prover_name) {
                if prover.can_handle(store, goal, context) {
                    return Some(rule.prover_name.to_string());
                }
            }
        }
        None
    }

    /// Attempts to prove `goal` given `context`, per spec §4.8.
    ///
    /// `resources` defaults to [`ResourceLimits::new`] (no limits) when
    /// omitted. The returned object's `time_ms` and
    /// `resources["time_taken_ms"]` are always the coordinator's own
    /// wall-clock measurement of the whole dispatch, overriding whatever
    /// the prover itself reported — every other field is the prover's
    /// `ProofObject` verbatim.
    pub fn submit_goal(&self, store: &mut AstStore, goal: AstId, context: &BTreeSet<AstId>, strategy_hint: Option<&str>, resources: Option<ResourceLimits>) -> ProofObject {
        let start = Instant::now();
        let resources = resources.unwrap_or_default();

        let Some(prover_name) = self.select_prover(store, goal, context, strategy_hint) else {
            log::debug!("no prover selected for goal {:?}", goal);
            return self.stamp(ProofObject::failure(CoordinatorError::NoSuitableProver.to_string(), "coordinator", 0, BTreeMap::new()), start);
        };

        log::debug!("dispatching goal {:?} to {}", goal, prover_name);
        // Every prover's `prove` is specified as total (spec §9), but a
        // coordinator that trusted that completely would let one bad
        // input anywhere in the call tree end the whole proof session;
        // `catch_unwind` makes the "provers never raise past their
        // boundary" policy (spec §7) hold even if one slips up.
        let prover = &self.provers[&prover_name];
        let outcome = catch_unwind(AssertUnwindSafe(|| prover.prove(store, goal, context, &resources)));

        let result = match outcome {
            Ok(proof) => proof,
            Err(payload) => {
                let message = panic_message(&payload);
                log::warn!("prover {} panicked: {}", prover_name, message);
                ProofObject::failure(
                    CoordinatorError::ProverPanicked { prover: prover_name.clone(), message }.to_string(),
                    prover_name,
                    0,
                    BTreeMap::new(),
                )
            }
        };

        self.stamp(result, start)
    }

    fn stamp(&self, result: ProofObject, start: Instant) -> ProofObject {
        let elapsed_ms = start.elapsed().as_millis() as u64;
        let mut resources = result.resources.clone();
        resources.insert("time_taken_ms".to_string(), elapsed_ms as f64);
        result.with_time_and_resources(elapsed_ms, resources)
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_ast::{ConnectiveKind, QuantifierKind, Type};

    fn propositional_fixture() -> (AstStore, AstId, BTreeSet<AstId>) {
        let mut store = AstStore::new();
        let p_name = store.intern("P");
        let q_name = store.intern("Q");
        let p = store.constant(p_name, None, Type::Boolean);
        let q = store.constant(q_name, None, Type::Boolean);
        let p_or_q = store.connective(ConnectiveKind::Or, vec![p, q], Type::Boolean);
        let not_q = store.connective(ConnectiveKind::Not, vec![q], Type::Boolean);

        let mut context = BTreeSet::new();
        context.insert(p_or_q);
        context.insert(not_q);
        (store, p, context)
    }

    #[test]
    fn default_dispatch_routes_propositional_goal_to_resolution() {
        let (mut store, goal, context) = propositional_fixture();
        let coordinator = Coordinator::with_provers(vec![Box::new(ResolutionProver::new())]);
        let result = coordinator.submit_goal(&mut store, goal, &context, None, None);
        assert!(result.achieved);
        assert_eq!(result.engine, "resolution_prover");
        assert!(result.resources.contains_key("time_taken_ms"));
    }

    #[test]
    fn modal_goal_routes_to_modal_tableau_regardless_of_registration_order() {
        let mut store = AstStore::new();
        let p_name = store.intern("P");
        let p = store.constant(p_name, None, Type::Boolean);
        let x_name = store.intern("x");
        let x = store.variable(x_name, 1, Type::Boolean);
        let _ = store.quantifier(QuantifierKind::ForAll, vec![1], x, Type::Boolean);
        let necessary_p = store.modal_op(reasoning_ast::ModalOpKind::Necessary, None, p, Type::Boolean);
        let goal = store.connective(ConnectiveKind::Implies, vec![necessary_p, p], Type::Boolean);

        let coordinator = Coordinator::with_provers(vec![Box::new(ResolutionProver::new()), Box::new(ModalTableauProver::new())]);
        let mut resources = ResourceLimits::new();
        resources = resources.with_additional("modal_system", "T");
        let result = coordinator.submit_goal(&mut store, goal, &BTreeSet::new(), None, Some(resources));
        assert_eq!(result.engine, "modal_tableau_prover");
    }

    #[test]
    fn unknown_goal_with_no_registered_provers_fails_cleanly() {
        let (mut store, goal, context) = propositional_fixture();
        let coordinator = Coordinator::with_provers(vec![]);
        let result = coordinator.submit_goal(&mut store, goal, &context, None, None);
        assert!(!result.achieved);
        assert_eq!(result.status, CoordinatorError::NoSuitableProver.to_string());
    }

    #[test]
    fn strategy_hint_overrides_default_dispatch_when_applicable() {
        let (mut store, goal, context) = propositional_fixture();
        let coordinator = Coordinator::with_provers(vec![Box::new(ResolutionProver::new())]);
        let result = coordinator.submit_goal(&mut store, goal, &context, Some("resolution_prover"), None);
        assert_eq!(result.engine, "resolution_prover");
    }
}
