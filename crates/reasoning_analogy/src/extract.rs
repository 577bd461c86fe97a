//! Pulling objects, predicates, and ground relations out of a domain.

use std::collections::BTreeSet;

use reasoning_ast::{AstId, AstNodeKind, AstStore};

/// The raw material a domain contributes to analogy-making: every
/// constant used as an argument (an object), every constant used as an
/// `Application` operator (a predicate), and every ground `Application`
/// node itself (a relation instance).
#[derive(Debug, Clone, Default)]
pub struct DomainSummary {
    pub objects: BTreeSet<AstId>,
    pub predicates: BTreeSet<AstId>,
    pub relations: BTreeSet<AstId>,
}

/// Summarizes every statement in `domain`, recursing through connectives
/// and quantifiers so relations nested inside `AND`/`OR` are still found.
pub fn extract_domain(store: &AstStore, domain: &BTreeSet<AstId>) -> DomainSummary {
    let mut summary = DomainSummary::default();
    for &stmt in domain {
        walk(store, stmt, &mut summary);
    }
    summary
}

fn walk(store: &AstStore, id: AstId, summary: &mut DomainSummary) {
    match store.get(id) {
        AstNodeKind::Constant { .. } => {
            summary.objects.insert(id);
        }
        AstNodeKind::Variable { .. } => {}
        AstNodeKind::Application { operator, args, .. } => {
            summary.predicates.insert(*operator);
            if is_ground(store, id) {
                summary.relations.insert(id);
            }
            for &arg in args {
                walk(store, arg, summary);
            }
        }
        AstNodeKind::Connective { operands, .. } => {
            for &op in operands {
                walk(store, op, summary);
            }
        }
        AstNodeKind::Quantifier { scope, .. } => walk(store, *scope, summary),
        AstNodeKind::ModalOp { agent, proposition, .. } => {
            if let Some(a) = agent {
                walk(store, *a, summary);
            }
            walk(store, *proposition, summary);
        }
    }
}

/// `true` if `id` contains no free or bound `Variable` node, i.e. it
/// denotes one concrete relation instance rather than a schema.
pub fn is_ground(store: &AstStore, id: AstId) -> bool {
    match store.get(id) {
        AstNodeKind::Constant { .. } => true,
        AstNodeKind::Variable { .. } => false,
        AstNodeKind::Application { operator, args, .. } => {
            is_ground(store, *operator) && args.iter().all(|&a| is_ground(store, a))
        }
        AstNodeKind::Connective { operands, .. } => operands.iter().all(|&o| is_ground(store, o)),
        AstNodeKind::Quantifier { .. } => false,
        AstNodeKind::ModalOp { agent, proposition, .. } => {
            agent.map(|a| is_ground(store, a)).unwrap_or(true) && is_ground(store, *proposition)
        }
    }
}

/// The constant's name and arity, when `id` is a predicate constant with
/// a function type. Arity 0 for a plain atomic-typed constant used
/// nullary (e.g. a proposition letter).
pub fn predicate_name_arity(store: &AstStore, id: AstId) -> (String, usize) {
    match store.get(id) {
        AstNodeKind::Constant { name, ty, .. } => {
            let arity = match ty {
                reasoning_ast::Type::Function(args, _) => args.len(),
                _ => 0,
            };
            (store.resolve(*name).to_string(), arity)
        }
        _ => (String::new(), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_ast::Type;

    #[test]
    fn extracts_objects_predicates_and_relations() {
        let mut store = AstStore::new();
        let is_in = store.intern("IsIn");
        let tv = store.intern("TV");
        let room = store.intern("LivingRoom");
        let room_ty = Type::Atomic(store.intern("Place"));
        let thing_ty = Type::Atomic(store.intern("Thing"));
        let pred_ty = Type::Function(vec![thing_ty.clone(), room_ty.clone()], Box::new(Type::Boolean));

        let is_in_fn = store.constant(is_in, None, pred_ty);
        let tv_const = store.constant(tv, None, thing_ty);
        let room_const = store.constant(room, None, room_ty);
        let relation = store.application(is_in_fn, vec![tv_const, room_const], Type::Boolean);

        let mut domain = BTreeSet::new();
        domain.insert(relation);

        let summary = extract_domain(&store, &domain);
        assert_eq!(summary.relations.len(), 1);
        assert!(summary.predicates.contains(&is_in_fn));
        assert!(summary.objects.contains(&tv_const));
        assert!(summary.objects.contains(&room_const));
    }
}
