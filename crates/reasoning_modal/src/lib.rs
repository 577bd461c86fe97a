//! Signed-formula semantic tableau over Kripke worlds.
//!
//! [`ModalTableauProver`] answers validity of a modal goal `G` given
//! context `Γ` and a modal system `S ∈ {K,T,D,B,S4,S5}` by attempting to
//! close a tableau seeded with `¬G ∪ Γ`: if every branch closes, `G` is
//! valid given `Γ` under `S`.

pub mod branch;
pub mod error;
pub mod rules;
pub mod system;
pub mod tableau;

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use reasoning_ast::{AstId, AstNodeKind, AstStore, ProofObject, ProofStep, Prover, ResourceLimits};
use reasoning_base::IdGen;

use branch::SignedFormula;
use system::ModalSystem;
use tableau::SearchOutcome;

#[derive(Debug, Default)]
pub struct ModalTableauProver;

impl ModalTableauProver {
    pub fn new() -> Self {
        ModalTableauProver
    }

    fn system_for(resources: &ResourceLimits) -> ModalSystem {
        resources
            .get_additional("modal_system")
            .and_then(ModalSystem::parse)
            .unwrap_or(ModalSystem::K)
    }
}

/// `true` if `id`, or any of its sub-terms, is a [`AstNodeKind::ModalOp`].
pub fn contains_modal_op(store: &AstStore, id: AstId) -> bool {
    match store.get(id) {
        AstNodeKind::ModalOp { .. } => true,
        AstNodeKind::Connective { operands, .. } => operands.iter().any(|&o| contains_modal_op(store, o)),
        AstNodeKind::Quantifier { scope, .. } => contains_modal_op(store, *scope),
        AstNodeKind::Application { args, .. } => args.iter().any(|&a| contains_modal_op(store, a)),
        AstNodeKind::Constant { .. } | AstNodeKind::Variable { .. } => false,
    }
}

impl Prover for ModalTableauProver {
    fn prove(&self, store: &mut AstStore, goal: AstId, context: &BTreeSet<AstId>, resources: &ResourceLimits) -> ProofObject {
        let start = Instant::now();
        let system = Self::system_for(resources);
        let mut id_gen = IdGen::new();

        let mut initial = vec![SignedFormula::new(goal, false)];
        for &c in context {
            initial.push(SignedFormula::new(c, true));
        }

        let max_branches = resources
            .get_additional("max_branches")
            .and_then(|s| s.parse::<usize>().ok())
            .or(resources.nodes_limit)
            .unwrap_or(10_000);
        let max_nodes = resources.nodes_limit.unwrap_or(100_000);
        let time_limit_ms = resources.time_limit_ms;

        let (outcome, branches, stats) = tableau::run(store, &mut id_gen, initial, system, max_branches, max_nodes, || {
            time_limit_ms
                .map(|limit| start.elapsed().as_millis() as u64 >= limit)
                .unwrap_or(false)
        });

        let mut resource_counters = BTreeMap::new();
        resource_counters.insert("nodes_explored".to_string(), stats.nodes_processed as f64);
        resource_counters.insert("worlds_created".to_string(), stats.worlds_created as f64);
        resource_counters.insert("branches".to_string(), branches.len() as f64);

        match outcome {
            SearchOutcome::Closed => {
                let negation_step = ProofStep::new(goal, "AssumeNegation", vec![])
                    .with_explanation("assume the goal's negation to seek a refutation".to_string());
                let closure_step = ProofStep::new(goal, "TableauClosure", vec![0]).with_explanation(format!(
                    "every branch of the {}-tableau for the negated goal closed",
                    system_name(system)
                ));
                ProofObject::success(
                    goal,
                    None,
                    vec![negation_step, closure_step],
                    context.clone(),
                    "modal_tableau_prover",
                    start.elapsed().as_millis() as u64,
                    resource_counters,
                )
            }
            SearchOutcome::Open => ProofObject::failure(
                "Failed: not valid (open branch found)",
                "modal_tableau_prover",
                start.elapsed().as_millis() as u64,
                resource_counters,
            ),
            SearchOutcome::ResourceExhausted(which) => ProofObject::failure(
                format!("Failed: {}", which),
                "modal_tableau_prover",
                start.elapsed().as_millis() as u64,
                resource_counters,
            ),
        }
    }

    fn can_handle(&self, store: &AstStore, goal: AstId, context: &BTreeSet<AstId>) -> bool {
        contains_modal_op(store, goal) || context.iter().any(|&c| contains_modal_op(store, c))
    }

    fn name(&self) -> &str {
        "modal_tableau_prover"
    }

    fn capabilities(&self) -> std::collections::HashMap<&'static str, bool> {
        let mut caps = std::collections::HashMap::new();
        caps.insert("modal_logic", true);
        caps.insert("propositional_logic", true);
        caps
    }
}

fn system_name(system: ModalSystem) -> &'static str {
    match system {
        ModalSystem::K => "K",
        ModalSystem::T => "T",
        ModalSystem::D => "D",
        ModalSystem::B => "B",
        ModalSystem::S4 => "S4",
        ModalSystem::S5 => "S5",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_ast::{ConnectiveKind, ModalOpKind, Type};

    #[test]
    fn box_p_implies_p_is_valid_in_t_but_not_k() {
        let mut store = AstStore::new();
        let p_name = store.intern("P");
        let p = store.constant(p_name, None, Type::Boolean);
        let boxed = store.modal_op(ModalOpKind::Necessary, None, p, Type::Boolean);
        let goal = store.connective(ConnectiveKind::Implies, vec![boxed, p], Type::Boolean);

        let prover = ModalTableauProver::new();
        let context = BTreeSet::new();

        let t_resources = ResourceLimits::new().with_additional("modal_system", "T");
        let t_result = prover.prove(&mut store, goal, &context, &t_resources);
        assert!(t_result.achieved);

        let k_resources = ResourceLimits::new().with_additional("modal_system", "K");
        let k_result = prover.prove(&mut store, goal, &context, &k_resources);
        assert!(!k_result.achieved);
    }

    #[test]
    fn can_handle_requires_a_modal_operator() {
        let mut store = AstStore::new();
        let p_name = store.intern("P");
        let p = store.constant(p_name, None, Type::Boolean);
        let boxed = store.modal_op(ModalOpKind::Necessary, None, p, Type::Boolean);

        let prover = ModalTableauProver::new();
        let context = BTreeSet::new();
        assert!(prover.can_handle(&store, boxed, &context));
        assert!(!prover.can_handle(&store, p, &context));
    }
}
