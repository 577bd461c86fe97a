//! Syntactic unification over the formula language.
//!
//! Unification only ever needs to relate variables, constants, and
//! applications — the terms that appear inside literals. Connectives,
//! quantifiers, and modal operators never appear as unification
//! arguments in this engine (clauses are already quantifier-free and
//! modal formulas are handled by the tableau prover's own matching), so
//! [`unify`] treats any other shape as a unification failure rather than
//! growing cases for them.

use crate::ast::{AstId, AstNodeKind, AstStore, VarId};
use crate::subst::{apply, Substitution};
use crate::types::Type;

/// Attempts to unify two terms, returning the most general substitution
/// that makes them syntactically equal, or `None` if no such
/// substitution exists.
pub fn unify(store: &mut AstStore, a: AstId, b: AstId) -> Option<Substitution> {
    if a == b {
        return Some(Substitution::new());
    }

    let node_a = store.get(a).clone();
    let node_b = store.get(b).clone();

    match (&node_a, &node_b) {
        (AstNodeKind::Variable { id: var, ty, .. }, _) => bind(store, *var, ty.clone(), b),
        (_, AstNodeKind::Variable { id: var, ty, .. }) => bind(store, *var, ty.clone(), a),

        (
            AstNodeKind::Constant {
                name: n1,
                value: v1,
                ty: t1,
            },
            AstNodeKind::Constant {
                name: n2,
                value: v2,
                ty: t2,
            },
        ) => {
            if n1 == n2 && v1 == v2 && t1 == t2 {
                Some(Substitution::new())
            } else {
                None
            }
        }

        (
            AstNodeKind::Application {
                operator: op1,
                args: args1,
                ty: ty1,
            },
            AstNodeKind::Application {
                operator: op2,
                args: args2,
                ty: ty2,
            },
        ) => {
            if ty1 != ty2 || args1.len() != args2.len() {
                return None;
            }
            let mut sub = unify(store, *op1, *op2)?;
            for (&x, &y) in args1.iter().zip(args2.iter()) {
                let x = apply(store, &sub, x);
                let y = apply(store, &sub, y);
                let step = unify(store, x, y)?;
                sub = compose(store, &sub, &step);
            }
            Some(sub)
        }

        _ => None,
    }
}

/// Composes two substitutions: applying `compose(s1, s2)` to a term must
/// equal applying `s1` then `s2`.
fn compose(store: &mut AstStore, s1: &Substitution, s2: &Substitution) -> Substitution {
    let mut result = Substitution::new();
    for (&var, &term) in s1 {
        result.insert(var, apply(store, s2, term));
    }
    for (&var, &term) in s2 {
        result.entry(var).or_insert(term);
    }
    result
}

/// Binds a variable to a term, after an occurs check and a type
/// compatibility check.
fn bind(store: &mut AstStore, var: VarId, ty: Type, term: AstId) -> Option<Substitution> {
    if let AstNodeKind::Variable { id: other, .. } = store.get(term) {
        if *other == var {
            return Some(Substitution::new());
        }
    }
    if !ty.compatible(store.type_of(term)) {
        return None;
    }
    if occurs(store, var, term) {
        return None;
    }
    let mut sub = Substitution::new();
    sub.insert(var, term);
    Some(sub)
}

/// Returns `true` if `var` occurs free within `term`.
fn occurs(store: &AstStore, var: VarId, term: AstId) -> bool {
    match store.get(term) {
        AstNodeKind::Variable { id, .. } => *id == var,
        AstNodeKind::Constant { .. } => false,
        AstNodeKind::Application { operator, args, .. } => {
            occurs(store, var, *operator) || args.iter().any(|&a| occurs(store, var, a))
        }
        AstNodeKind::Connective { operands, .. } => operands.iter().any(|&o| occurs(store, var, o)),
        AstNodeKind::Quantifier {
            bound_vars, scope, ..
        } => !bound_vars.contains(&var) && occurs(store, var, *scope),
        AstNodeKind::ModalOp {
            agent, proposition, ..
        } => agent.map_or(false, |a| occurs(store, var, a)) || occurs(store, var, *proposition),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ConnectiveKind;

    #[test]
    fn unifies_variable_with_constant() {
        let mut store = AstStore::new();
        let x_name = store.intern("x");
        let socrates_name = store.intern("socrates");
        let var = store.variable(x_name, 1, Type::Atomic(socrates_name));
        let constant = store.constant(socrates_name, None, Type::Atomic(socrates_name));

        let sub = unify(&mut store, var, constant).expect("should unify");
        assert_eq!(sub.get(&1), Some(&constant));
    }

    #[test]
    fn fails_on_mismatched_constants() {
        let mut store = AstStore::new();
        let a_name = store.intern("a");
        let b_name = store.intern("b");
        let a = store.constant(a_name, None, Type::Atomic(a_name));
        let b = store.constant(b_name, None, Type::Atomic(b_name));
        assert!(unify(&mut store, a, b).is_none());
    }

    #[test]
    fn unifies_applications_with_shared_variable_binding() {
        let mut store = AstStore::new();
        let mortal = store.intern("Mortal");
        let socrates_name = store.intern("socrates");
        let x_name = store.intern("x");
        let ty = Type::Function(vec![Type::Atomic(socrates_name)], Box::new(Type::Boolean));
        let op = store.constant(mortal, None, ty);

        let var = store.variable(x_name, 1, Type::Atomic(socrates_name));
        let lhs = store.application(op, vec![var], Type::Boolean);

        let constant = store.constant(socrates_name, None, Type::Atomic(socrates_name));
        let rhs = store.application(op, vec![constant], Type::Boolean);

        let sub = unify(&mut store, lhs, rhs).expect("should unify");
        assert_eq!(sub.get(&1), Some(&constant));
    }

    #[test]
    fn occurs_check_rejects_cyclic_binding() {
        let mut store = AstStore::new();
        let f_name = store.intern("f");
        let x_name = store.intern("x");
        let socrates_name = store.intern("socrates");
        let ty = Type::Function(vec![Type::Atomic(socrates_name)], Box::new(Type::Atomic(socrates_name)));
        let f = store.constant(f_name, None, ty);

        let var = store.variable(x_name, 1, Type::Atomic(socrates_name));
        let f_of_x = store.application(f, vec![var], Type::Atomic(socrates_name));

        assert!(unify(&mut store, var, f_of_x).is_none());
    }

    #[test]
    fn connectives_and_quantifiers_never_unify() {
        let mut store = AstStore::new();
        let p_name = store.intern("p");
        let p = store.constant(p_name, None, Type::Boolean);
        let not_p = store.connective(ConnectiveKind::Not, vec![p], Type::Boolean);
        assert!(unify(&mut store, not_p, p).is_none());
    }
}
