//! Projecting a source-domain expression into the target domain of an
//! established mapping.

use reasoning_ast::{AstId, AstNodeKind, AstStore};

use crate::mapping::AnalogicalMapping;

/// Walks `expr`, replacing every constant via `mapping.object_pairs` and
/// every predicate operator via `mapping.predicate_pairs`. Returns `None`
/// the moment any symbol along the way has no correspondence in
/// `mapping` — per spec §4.7, "any unmapped symbol aborts projection".
///
/// Bound and free variables pass through unchanged: a mapping
/// corresponds objects and predicates, not variable identities.
pub fn project(store: &mut AstStore, mapping: &AnalogicalMapping, expr: AstId) -> Option<AstId> {
    match store.get(expr).clone() {
        AstNodeKind::Constant { .. } => mapping.object_pairs.get(&expr).copied(),
        AstNodeKind::Variable { .. } => Some(expr),
        AstNodeKind::Application { operator, args, ty } => {
            let new_operator = mapping
                .predicate_pairs
                .get(&operator)
                .or_else(|| mapping.object_pairs.get(&operator))
                .copied()?;
            let mut new_args = Vec::with_capacity(args.len());
            for arg in args {
                new_args.push(project(store, mapping, arg)?);
            }
            Some(store.application(new_operator, new_args, ty))
        }
        AstNodeKind::Connective { kind, operands, ty } => {
            let mut new_operands = Vec::with_capacity(operands.len());
            for operand in operands {
                new_operands.push(project(store, mapping, operand)?);
            }
            Some(store.connective(kind, new_operands, ty))
        }
        AstNodeKind::Quantifier { kind, bound_vars, scope, ty } => {
            let new_scope = project(store, mapping, scope)?;
            Some(store.quantifier(kind, bound_vars, new_scope, ty))
        }
        AstNodeKind::ModalOp { op, agent, proposition, ty } => {
            let new_agent = match agent {
                Some(a) => Some(project(store, mapping, a)?),
                None => None,
            };
            let new_proposition = project(store, mapping, proposition)?;
            Some(store.modal_op(op, new_agent, new_proposition, ty))
        }
    }
}
