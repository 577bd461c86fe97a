//! Substitution of variables by terms, applied over the whole formula
//! language.

use std::collections::HashMap;

use crate::ast::{AstId, AstNodeKind, AstStore, VarId};

/// A mapping from variable identity to the term replacing it.
///
/// Plain `HashMap` rather than a dedicated type: substitutions are built
/// incrementally by [`crate::unify::unify`] and consumed structurally by
/// every prover, so there is no invariant beyond "each `VarId` maps to
/// one term" worth hiding behind a newtype.
pub type Substitution = HashMap<VarId, AstId>;

/// Applies a substitution to a formula, re-interning the result.
///
/// Sub-terms untouched by the substitution are returned unchanged (not
/// merely equal): walking a node whose children all map to themselves
/// re-interns to the same [`AstId`] it started from, so applying an
/// empty or irrelevant substitution is cheap and leaves sharing intact.
pub fn apply(store: &mut AstStore, sub: &Substitution, id: AstId) -> AstId {
    let node = store.get(id).clone();
    match node {
        AstNodeKind::Constant { .. } => id,
        AstNodeKind::Variable { id: var, ty, .. } => {
            match sub.get(&var) {
                Some(&replacement) => replacement,
                None => {
                    let _ = ty;
                    id
                }
            }
        }
        AstNodeKind::Application { operator, args, ty } => {
            let new_operator = apply(store, sub, operator);
            let new_args: Vec<AstId> = args.iter().map(|&a| apply(store, sub, a)).collect();
            if new_operator == operator && new_args == args {
                return id;
            }
            store.application(new_operator, new_args, ty)
        }
        AstNodeKind::Connective { kind, operands, ty } => {
            let new_operands: Vec<AstId> = operands.iter().map(|&o| apply(store, sub, o)).collect();
            if new_operands == operands {
                return id;
            }
            store.connective(kind, new_operands, ty)
        }
        AstNodeKind::Quantifier {
            kind,
            bound_vars,
            scope,
            ty,
        } => {
            // Bound variables shadow any substitution entry with the same
            // id; since every variable in this engine is standardized
            // apart before substitution is ever built, a substitution
            // entry for a variable that a quantifier re-binds here would
            // indicate a bug upstream rather than a case to handle.
            let new_scope = apply(store, sub, scope);
            if new_scope == scope {
                return id;
            }
            store.quantifier(kind, bound_vars, new_scope, ty)
        }
        AstNodeKind::ModalOp {
            op,
            agent,
            proposition,
            ty,
        } => {
            let new_agent = agent.map(|a| apply(store, sub, a));
            let new_proposition = apply(store, sub, proposition);
            if new_agent == agent && new_proposition == proposition {
                return id;
            }
            store.modal_op(op, new_agent, new_proposition, ty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;

    #[test]
    fn apply_replaces_bound_variable_occurrence() {
        let mut store = AstStore::new();
        let x_name = store.intern("x");
        let socrates_name = store.intern("socrates");
        let var = store.variable(x_name, 1, Type::Atomic(socrates_name));
        let constant = store.constant(socrates_name, None, Type::Atomic(socrates_name));

        let mut sub = Substitution::new();
        sub.insert(1, constant);

        let result = apply(&mut store, &sub, var);
        assert_eq!(result, constant);
    }

    #[test]
    fn apply_is_identity_when_substitution_does_not_touch_term() {
        let mut store = AstStore::new();
        let socrates_name = store.intern("socrates");
        let constant = store.constant(socrates_name, None, Type::Atomic(socrates_name));

        let sub = Substitution::new();
        let result = apply(&mut store, &sub, constant);
        assert_eq!(result, constant);
    }

    #[test]
    fn apply_propagates_through_application_args() {
        let mut store = AstStore::new();
        let mortal = store.intern("Mortal");
        let x_name = store.intern("x");
        let socrates_name = store.intern("socrates");
        let ty = Type::Function(vec![Type::Atomic(socrates_name)], Box::new(Type::Boolean));
        let op = store.constant(mortal, None, ty);
        let var = store.variable(x_name, 1, Type::Atomic(socrates_name));
        let app = store.application(op, vec![var], Type::Boolean);

        let constant = store.constant(socrates_name, None, Type::Atomic(socrates_name));
        let mut sub = Substitution::new();
        sub.insert(1, constant);

        let result = apply(&mut store, &sub, app);
        match store.get(result) {
            AstNodeKind::Application { args, .. } => assert_eq!(args[0], constant),
            _ => panic!("expected application"),
        }
    }
}
