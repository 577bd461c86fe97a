//! The priority-ordered rule table that chooses a prover for a goal.

use reasoning_ast::{AstId, AstNodeKind, AstStore};

const ARITHMETIC_OPERATORS: &[&str] = &["+", "-", "*", "/", "<", "<=", ">", ">=", "="];
const CONSTRAINT_PREDICATES: &[&str] = &["AllDifferent", "SumEquals", "Element"];
const CONSTRAINT_PREFIX: &str = "Constraint";

/// Duplicated from `reasoning-analogy`'s own goal vocabulary rather than
/// imported: the coordinator needs to recognize an analogy goal's shape
/// to place it in the priority table, without reaching into that crate's
/// internals to do it (the same "each crate owns its predicate_name
/// helper" convention `reasoning-clp`/`reasoning-smt` already follow).
const ANALOGY_PREDICATES: &[&str] = &[
    "FindAnalogy",
    "FindMapping",
    "StructuralMapping",
    "FindAnalogicalMapping",
    "ProjectInference",
    "ProjectAnalogy",
    "TransferKnowledge",
];

/// One entry of the dispatch table: a priority, the prover it routes to,
/// and the syntactic test on `goal` that decides whether the rule fires.
pub struct DispatchRule {
    pub priority: i32,
    pub prover_name: &'static str,
    pub predicate: fn(&AstStore, AstId) -> bool,
}

/// The default rule table: modal, analogy, arithmetic, and constraint
/// goals each route to their specialist before falling back to
/// resolution, already sorted by descending priority.
pub fn default_rules() -> Vec<DispatchRule> {
    let mut rules = vec![
        DispatchRule { priority: 100, prover_name: "modal_tableau_prover", predicate: contains_modal_op },
        DispatchRule { priority: 95, prover_name: "analogical_engine", predicate: is_analogy_goal },
        DispatchRule { priority: 90, prover_name: "smt_interface", predicate: contains_arithmetic },
        DispatchRule { priority: 80, prover_name: "clp_module", predicate: contains_constraint_predicate },
        DispatchRule { priority: 10, prover_name: "resolution_prover", predicate: |_, _| true },
    ];
    rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    rules
}

fn top_level_name<'a>(store: &'a AstStore, id: AstId) -> Option<&'a str> {
    match store.get(id) {
        AstNodeKind::Application { operator, .. } => match store.get(*operator) {
            AstNodeKind::Constant { name, .. } => Some(store.resolve(*name)),
            _ => None,
        },
        _ => None,
    }
}

/// `true` if `id` or any sub-term is a [`AstNodeKind::ModalOp`].
pub fn contains_modal_op(store: &AstStore, id: AstId) -> bool {
    match store.get(id) {
        AstNodeKind::ModalOp { .. } => true,
        AstNodeKind::Constant { .. } | AstNodeKind::Variable { .. } => false,
        AstNodeKind::Application { operator, args, .. } => {
            contains_modal_op(store, *operator) || args.iter().any(|&a| contains_modal_op(store, a))
        }
        AstNodeKind::Connective { operands, .. } => operands.iter().any(|&o| contains_modal_op(store, o)),
        AstNodeKind::Quantifier { scope, .. } => contains_modal_op(store, *scope),
    }
}

/// `true` if `id` contains an `Application` whose operator is an
/// arithmetic comparator or numeric operator.
pub fn contains_arithmetic(store: &AstStore, id: AstId) -> bool {
    match store.get(id) {
        AstNodeKind::Application { operator, args, .. } => {
            let is_arithmetic = matches!(store.get(*operator), AstNodeKind::Constant { name, .. } if ARITHMETIC_OPERATORS.contains(&store.resolve(*name)));
            is_arithmetic || args.iter().any(|&a| contains_arithmetic(store, a))
        }
        AstNodeKind::Connective { operands, .. } => operands.iter().any(|&o| contains_arithmetic(store, o)),
        AstNodeKind::Quantifier { scope, .. } => contains_arithmetic(store, *scope),
        AstNodeKind::ModalOp { proposition, .. } => contains_arithmetic(store, *proposition),
        AstNodeKind::Constant { .. } | AstNodeKind::Variable { .. } => false,
    }
}

/// `true` if `id` contains an `Application` naming a registered
/// constraint predicate, or whose name is prefixed `Constraint`.
pub fn contains_constraint_predicate(store: &AstStore, id: AstId) -> bool {
    match store.get(id) {
        AstNodeKind::Application { operator, args, .. } => {
            let is_constraint = matches!(store.get(*operator), AstNodeKind::Constant { name, .. } if {
                let resolved = store.resolve(*name);
                CONSTRAINT_PREDICATES.contains(&resolved) || resolved.starts_with(CONSTRAINT_PREFIX)
            });
            is_constraint || args.iter().any(|&a| contains_constraint_predicate(store, a))
        }
        AstNodeKind::Connective { operands, .. } => operands.iter().any(|&o| contains_constraint_predicate(store, o)),
        AstNodeKind::Quantifier { scope, .. } => contains_constraint_predicate(store, *scope),
        AstNodeKind::ModalOp { proposition, .. } => contains_constraint_predicate(store, *proposition),
        AstNodeKind::Constant { .. } | AstNodeKind::Variable { .. } => false,
    }
}

/// `true` if `id`'s top-level predicate names an analogy task.
pub fn is_analogy_goal(store: &AstStore, id: AstId) -> bool {
    top_level_name(store, id).is_some_and(|n| ANALOGY_PREDICATES.contains(&n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_ast::Type;

    #[test]
    fn default_rules_are_sorted_by_descending_priority() {
        let rules = default_rules();
        for w in rules.windows(2) {
            assert!(w[0].priority >= w[1].priority);
        }
        assert_eq!(rules.last().unwrap().prover_name, "resolution_prover");
    }

    #[test]
    fn detects_arithmetic_comparator() {
        let mut store = AstStore::new();
        let gt = store.intern(">");
        let ty = Type::Function(vec![Type::Integer, Type::Integer], Box::new(Type::Boolean));
        let gt_fn = store.constant(gt, None, ty);
        let a_name = store.intern("a");
        let b_name = store.intern("b");
        let a = store.constant(a_name, None, Type::Integer);
        let b = store.constant(b_name, None, Type::Integer);
        let app = store.application(gt_fn, vec![a, b], Type::Boolean);
        assert!(contains_arithmetic(&store, app));
    }
}
