//! First-order CNF conversion and binary resolution.
//!
//! Given a goal `G` and context `Γ`, [`ResolutionProver`] attempts to
//! derive `Γ ⊨ G` by refuting `Γ ∪ {¬G}`: convert every formula to
//! clause form, then resolve clauses against each other (set-of-support
//! starting from the negated goal) until the empty clause appears or a
//! resource limit is hit.

pub mod clause;
pub mod cnf;
pub mod error;
pub mod resolve;

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use reasoning_ast::{AstId, AstStore, ConnectiveKind, ProofObject, Prover, ResourceLimits};
use reasoning_base::IdGen;

use clause::ClauseSource;
use error::ResolutionError;

/// The default first-order resolution prover.
///
/// Holds no state between calls: every `prove` invocation builds its own
/// [`IdGen`] so that proof attempts never compete over fresh variable or
/// Skolem-function numbering.
#[derive(Debug, Default)]
pub struct ResolutionProver;

impl ResolutionProver {
    pub fn new() -> Self {
        ResolutionProver
    }
}

impl Prover for ResolutionProver {
    fn prove(&self, store: &mut AstStore, goal: AstId, context: &BTreeSet<AstId>, resources: &ResourceLimits) -> ProofObject {
        let start = Instant::now();
        let mut id_gen = IdGen::new();

        let mut context_clauses = Vec::new();
        for (i, &formula) in context.iter().enumerate() {
            match cnf::to_cnf_clauses(store, &mut id_gen, formula) {
                Ok(clauses) => {
                    for literals in clauses {
                        context_clauses.push((literals, ClauseSource::Context(i)));
                    }
                }
                Err(e) => return failure(e.to_string(), start.elapsed().as_millis() as u64),
            }
        }

        let goal_ty = store.type_of(goal).clone();
        let negated_goal = store.connective(ConnectiveKind::Not, vec![goal], goal_ty);
        let negated_goal_clauses = match cnf::to_cnf_clauses(store, &mut id_gen, negated_goal) {
            Ok(clauses) => clauses,
            Err(e) => return failure(e.to_string(), start.elapsed().as_millis() as u64),
        };

        match resolve::resolve(store, &mut id_gen, goal, context_clauses, negated_goal_clauses, resources) {
            Ok(result) => result.proof_object.with_time_and_resources(
                start.elapsed().as_millis() as u64,
                result.proof_object.resources.clone(),
            ),
            Err(e) => failure(e.to_string(), start.elapsed().as_millis() as u64),
        }
    }

    fn can_handle(&self, _store: &AstStore, _goal: AstId, _context: &BTreeSet<AstId>) -> bool {
        // Resolution is the fallback strategy: it can at least attempt
        // any goal the coordinator routes to it (modal/arithmetic/
        // constraint goals are filtered out upstream by dispatch
        // priority before reaching here).
        true
    }

    fn name(&self) -> &str {
        "resolution_prover"
    }

    fn capabilities(&self) -> std::collections::HashMap<&'static str, bool> {
        let mut caps = std::collections::HashMap::new();
        caps.insert("first_order_logic", true);
        caps.insert("propositional_logic", true);
        caps.insert("equality", false);
        caps
    }
}

fn failure(status: impl Into<String>, time_ms: u64) -> ProofObject {
    ProofObject::failure(status, "resolution_prover", time_ms, BTreeMap::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_ast::{QuantifierKind, Type};

    #[test]
    fn proves_mortal_socrates_by_refutation() {
        let mut store = AstStore::new();
        let human = store.intern("Human");
        let mortal = store.intern("Mortal");
        let socrates = store.intern("socrates");
        let x_name = store.intern("x");
        let person_ty = Type::Atomic(store.intern("Person"));
        let pred_ty = Type::Function(vec![person_ty.clone()], Box::new(Type::Boolean));

        let human_fn = store.constant(human, None, pred_ty.clone());
        let mortal_fn = store.constant(mortal, None, pred_ty);
        let socrates_const = store.constant(socrates, None, person_ty.clone());

        let x = store.variable(x_name, 1, person_ty.clone());
        let human_x = store.application(human_fn, vec![x], Type::Boolean);
        let mortal_x = store.application(mortal_fn, vec![x], Type::Boolean);
        let implication = store.connective(ConnectiveKind::Implies, vec![human_x, mortal_x], Type::Boolean);
        let rule = store.quantifier(QuantifierKind::ForAll, vec![1], implication, Type::Boolean);

        let human_socrates = store.application(human_fn, vec![socrates_const], Type::Boolean);
        let mortal_socrates = store.application(mortal_fn, vec![socrates_const], Type::Boolean);

        let mut context = BTreeSet::new();
        context.insert(rule);
        context.insert(human_socrates);

        let prover = ResolutionProver::new();
        let result = prover.prove(&mut store, mortal_socrates, &context, &ResourceLimits::new());

        assert!(result.achieved);
        assert_eq!(result.status, "Proved");
        assert!(!result.steps.is_empty());
    }

    #[test]
    fn fails_when_goal_is_not_entailed() {
        let mut store = AstStore::new();
        let human = store.intern("Human");
        let mortal = store.intern("Mortal");
        let plato = store.intern("plato");
        let person_ty = Type::Atomic(store.intern("Person"));
        let pred_ty = Type::Function(vec![person_ty.clone()], Box::new(Type::Boolean));

        let human_fn = store.constant(human, None, pred_ty.clone());
        let mortal_fn = store.constant(mortal, None, pred_ty);
        let plato_const = store.constant(plato, None, person_ty);

        let human_plato = store.application(human_fn, vec![plato_const], Type::Boolean);
        let mortal_plato = store.application(mortal_fn, vec![plato_const], Type::Boolean);

        let mut context = BTreeSet::new();
        context.insert(human_plato);

        let prover = ResolutionProver::new();
        let resources = ResourceLimits::new().with_nodes_limit(50).with_time_limit_ms(1000);
        let result = prover.prove(&mut store, mortal_plato, &context, &resources);

        assert!(!result.achieved);
    }
}
