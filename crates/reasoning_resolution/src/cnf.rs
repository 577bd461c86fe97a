//! Conjunctive-normal-form conversion: the seven-pass pipeline that turns
//! an arbitrary first-order formula into a set of clauses.
//!
//! Each pass is a pure `AstId -> AstId` rewrite over the shared
//! hash-consed store; see the module-level pass functions for the
//! individual steps. [`to_cnf_clauses`] runs the whole pipeline.

use std::collections::{BTreeSet, HashMap};

use reasoning_ast::{AstId, AstNodeKind, AstStore, ConnectiveKind, QuantifierKind, Type, VarId};
use reasoning_base::{IdGen, Symbol};

use crate::clause::Literal;
use crate::error::ResolutionError;

/// Runs the full CNF pipeline and extracts clauses.
pub fn to_cnf_clauses(
    store: &mut AstStore,
    id_gen: &mut IdGen,
    formula: AstId,
) -> Result<Vec<BTreeSet<Literal>>, ResolutionError> {
    let no_implies = eliminate_implications(store, formula)?;
    let nnf = to_nnf(store, no_implies)?;
    let apart = standardize_apart(store, id_gen, apart_seed(), nnf)?;
    let skolemized = skolemize(store, id_gen, &[], apart)?;
    let no_quantifiers = strip_universals(store, skolemized)?;
    let cnf = distribute(store, no_quantifiers)?;
    let mut clauses = Vec::new();
    extract_clauses(store, cnf, &mut clauses);
    Ok(clauses)
}

fn apart_seed() -> HashMap<VarId, AstId> {
    HashMap::new()
}

/// Step 1: eliminate `IMPLIES` and `EQUIV` in favor of `NOT`/`AND`/`OR`.
fn eliminate_implications(store: &mut AstStore, id: AstId) -> Result<AstId, ResolutionError> {
    let node = store.get(id).clone();
    match node {
        AstNodeKind::Constant { .. } | AstNodeKind::Variable { .. } | AstNodeKind::Application { .. } => Ok(id),
        AstNodeKind::Connective {
            kind: ConnectiveKind::Implies,
            operands,
            ty,
        } => {
            let a = eliminate_implications(store, operands[0])?;
            let b = eliminate_implications(store, operands[1])?;
            let not_a = store.connective(ConnectiveKind::Not, vec![a], ty.clone());
            Ok(store.connective(ConnectiveKind::Or, vec![not_a, b], ty))
        }
        AstNodeKind::Connective {
            kind: ConnectiveKind::Equiv,
            operands,
            ty,
        } => {
            let a = eliminate_implications(store, operands[0])?;
            let b = eliminate_implications(store, operands[1])?;
            let not_a = store.connective(ConnectiveKind::Not, vec![a], ty.clone());
            let not_b = store.connective(ConnectiveKind::Not, vec![b], ty.clone());
            let left = store.connective(ConnectiveKind::Or, vec![not_a, b], ty.clone());
            let right = store.connective(ConnectiveKind::Or, vec![a, not_b], ty.clone());
            Ok(store.connective(ConnectiveKind::And, vec![left, right], ty))
        }
        AstNodeKind::Connective { kind, operands, ty } => {
            let new_operands = operands
                .iter()
                .map(|&o| eliminate_implications(store, o))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(store.connective(kind, new_operands, ty))
        }
        AstNodeKind::Quantifier {
            kind,
            bound_vars,
            scope,
            ty,
        } => {
            let new_scope = eliminate_implications(store, scope)?;
            Ok(store.quantifier(kind, bound_vars, new_scope, ty))
        }
        AstNodeKind::ModalOp { .. } => Err(ResolutionError::UnsupportedConstruct(
            "modal operator reached the resolution prover".to_string(),
        )),
    }
}

/// Step 2: push `NOT` inward via De Morgan and quantifier duality,
/// eliminating double negation along the way.
fn to_nnf(store: &mut AstStore, id: AstId) -> Result<AstId, ResolutionError> {
    to_nnf_rec(store, id, false)
}

fn to_nnf_rec(store: &mut AstStore, id: AstId, negate: bool) -> Result<AstId, ResolutionError> {
    let node = store.get(id).clone();
    match node {
        AstNodeKind::Constant { .. } | AstNodeKind::Variable { .. } | AstNodeKind::Application { .. } => {
            if negate {
                let ty = node.ty().clone();
                Ok(store.connective(ConnectiveKind::Not, vec![id], ty))
            } else {
                Ok(id)
            }
        }
        AstNodeKind::Connective {
            kind: ConnectiveKind::Not,
            operands,
            ..
        } => to_nnf_rec(store, operands[0], !negate),
        AstNodeKind::Connective {
            kind: ConnectiveKind::And,
            operands,
            ty,
        } => {
            let target_kind = if negate { ConnectiveKind::Or } else { ConnectiveKind::And };
            let new_operands = operands
                .iter()
                .map(|&o| to_nnf_rec(store, o, negate))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(store.connective(target_kind, new_operands, ty))
        }
        AstNodeKind::Connective {
            kind: ConnectiveKind::Or,
            operands,
            ty,
        } => {
            let target_kind = if negate { ConnectiveKind::And } else { ConnectiveKind::Or };
            let new_operands = operands
                .iter()
                .map(|&o| to_nnf_rec(store, o, negate))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(store.connective(target_kind, new_operands, ty))
        }
        AstNodeKind::Connective { .. } => Err(ResolutionError::UnsupportedConstruct(
            "IMPLIES/EQUIV survived implication elimination".to_string(),
        )),
        AstNodeKind::Quantifier {
            kind,
            bound_vars,
            scope,
            ty,
        } => {
            let target_kind = match (kind, negate) {
                (QuantifierKind::ForAll, false) => QuantifierKind::ForAll,
                (QuantifierKind::ForAll, true) => QuantifierKind::Exists,
                (QuantifierKind::Exists, false) => QuantifierKind::Exists,
                (QuantifierKind::Exists, true) => QuantifierKind::ForAll,
            };
            let new_scope = to_nnf_rec(store, scope, negate)?;
            Ok(store.quantifier(target_kind, bound_vars, new_scope, ty))
        }
        AstNodeKind::ModalOp { .. } => Err(ResolutionError::UnsupportedConstruct(
            "modal operator reached the resolution prover".to_string(),
        )),
    }
}

/// Finds the name and type originally recorded for a bound variable by
/// locating one of its occurrences within `id`.
fn find_var_info(store: &AstStore, id: AstId, var: VarId) -> Option<(Symbol, Type)> {
    match store.get(id) {
        AstNodeKind::Variable { name, id: v, ty } if *v == var => Some((*name, ty.clone())),
        AstNodeKind::Variable { .. } | AstNodeKind::Constant { .. } => None,
        AstNodeKind::Application { operator, args, .. } => {
            find_var_info(store, *operator, var).or_else(|| args.iter().find_map(|&a| find_var_info(store, a, var)))
        }
        AstNodeKind::Connective { operands, .. } => operands.iter().find_map(|&o| find_var_info(store, o, var)),
        AstNodeKind::Quantifier { scope, .. } => find_var_info(store, *scope, var),
        AstNodeKind::ModalOp { agent, proposition, .. } => agent
            .and_then(|a| find_var_info(store, a, var))
            .or_else(|| find_var_info(store, *proposition, var)),
    }
}

/// Step 3: rebind every quantifier's variables to fresh IDs so no two
/// quantifiers in the formula share a bound variable.
fn standardize_apart(
    store: &mut AstStore,
    id_gen: &mut IdGen,
    rename: HashMap<VarId, AstId>,
    id: AstId,
) -> Result<AstId, ResolutionError> {
    let node = store.get(id).clone();
    match node {
        AstNodeKind::Constant { .. } => Ok(id),
        AstNodeKind::Variable { id: v, .. } => Ok(*rename.get(&v).unwrap_or(&id)),
        AstNodeKind::Application { operator, args, ty } => {
            let new_operator = standardize_apart(store, id_gen, rename.clone(), operator)?;
            let new_args = args
                .iter()
                .map(|&a| standardize_apart(store, id_gen, rename.clone(), a))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(store.application(new_operator, new_args, ty))
        }
        AstNodeKind::Connective { kind, operands, ty } => {
            let new_operands = operands
                .iter()
                .map(|&o| standardize_apart(store, id_gen, rename.clone(), o))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(store.connective(kind, new_operands, ty))
        }
        AstNodeKind::Quantifier {
            kind,
            bound_vars,
            scope,
            ty,
        } => {
            let mut new_rename = rename.clone();
            let mut new_bound = Vec::with_capacity(bound_vars.len());
            for v in &bound_vars {
                let (name, var_ty) = find_var_info(store, scope, *v).unwrap_or((Symbol::EMPTY, Type::Boolean));
                let fresh = id_gen.next();
                let fresh_node = store.variable(name, fresh, var_ty);
                new_rename.insert(*v, fresh_node);
                new_bound.push(fresh);
            }
            let new_scope = standardize_apart(store, id_gen, new_rename, scope)?;
            Ok(store.quantifier(kind, new_bound, new_scope, ty))
        }
        AstNodeKind::ModalOp { .. } => Err(ResolutionError::UnsupportedConstruct(
            "modal operator reached the resolution prover".to_string(),
        )),
    }
}

/// Step 4: replace every existential with a Skolem function over the
/// universals currently in scope (a Skolem constant when there are
/// none).
fn skolemize(
    store: &mut AstStore,
    id_gen: &mut IdGen,
    universals: &[(VarId, Type)],
    id: AstId,
) -> Result<AstId, ResolutionError> {
    let node = store.get(id).clone();
    match node {
        AstNodeKind::Constant { .. } | AstNodeKind::Variable { .. } | AstNodeKind::Application { .. } => Ok(id),
        AstNodeKind::Connective { kind, operands, ty } => {
            let new_operands = operands
                .iter()
                .map(|&o| skolemize(store, id_gen, universals, o))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(store.connective(kind, new_operands, ty))
        }
        AstNodeKind::Quantifier {
            kind: QuantifierKind::ForAll,
            bound_vars,
            scope,
            ty,
        } => {
            let mut extended = universals.to_vec();
            for v in &bound_vars {
                let (_, var_ty) = find_var_info(store, scope, *v).unwrap_or((Symbol::EMPTY, Type::Boolean));
                extended.push((*v, var_ty));
            }
            let new_scope = skolemize(store, id_gen, &extended, scope)?;
            Ok(store.quantifier(QuantifierKind::ForAll, bound_vars, new_scope, ty))
        }
        AstNodeKind::Quantifier {
            kind: QuantifierKind::Exists,
            bound_vars,
            scope,
            ..
        } => {
            let mut substitution: HashMap<VarId, AstId> = HashMap::new();
            for v in &bound_vars {
                let (_, var_ty) = find_var_info(store, scope, *v).unwrap_or((Symbol::EMPTY, Type::Boolean));
                let skolem_name = store.intern(&format!("sk{}", id_gen.next()));
                let term = if universals.is_empty() {
                    store.constant(skolem_name, None, var_ty)
                } else {
                    let arg_types: Vec<Type> = universals.iter().map(|(_, t)| t.clone()).collect();
                    let fn_ty = Type::Function(arg_types, Box::new(var_ty.clone()));
                    let skolem_fn = store.constant(skolem_name, None, fn_ty);
                    let args: Vec<AstId> = universals
                        .iter()
                        .map(|(uv, ut)| {
                            let uname = store.intern(&format!("u{}", uv));
                            store.variable(uname, *uv, ut.clone())
                        })
                        .collect();
                    store.application(skolem_fn, args, var_ty)
                };
                substitution.insert(*v, term);
            }
            let substituted = reasoning_ast::apply(store, &substitution, scope);
            skolemize(store, id_gen, universals, substituted)
        }
        AstNodeKind::ModalOp { .. } => Err(ResolutionError::UnsupportedConstruct(
            "modal operator reached the resolution prover".to_string(),
        )),
    }
}

/// Step 5: drop the now-implicit universal quantifiers.
fn strip_universals(store: &mut AstStore, id: AstId) -> Result<AstId, ResolutionError> {
    let node = store.get(id).clone();
    match node {
        AstNodeKind::Constant { .. } | AstNodeKind::Variable { .. } | AstNodeKind::Application { .. } => Ok(id),
        AstNodeKind::Connective { kind, operands, ty } => {
            let new_operands = operands
                .iter()
                .map(|&o| strip_universals(store, o))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(store.connective(kind, new_operands, ty))
        }
        AstNodeKind::Quantifier {
            kind: QuantifierKind::ForAll,
            scope,
            ..
        } => strip_universals(store, scope),
        AstNodeKind::Quantifier {
            kind: QuantifierKind::Exists,
            ..
        } => Err(ResolutionError::UnsupportedConstruct(
            "existential survived Skolemization".to_string(),
        )),
        AstNodeKind::ModalOp { .. } => Err(ResolutionError::UnsupportedConstruct(
            "modal operator reached the resolution prover".to_string(),
        )),
    }
}

/// Builds a connective over `parts`, collapsing to the bare element when
/// there is only one — `operands` is never empty for a well-formed
/// `And`/`Or` node, but folding may still bottom out at a single part.
fn fold_connective(store: &mut AstStore, kind: ConnectiveKind, mut parts: Vec<AstId>, ty: Type) -> AstId {
    if parts.len() == 1 {
        parts.pop().unwrap()
    } else {
        store.connective(kind, parts, ty)
    }
}

/// Distributes a single `OR` pair over whichever side is an `AND`,
/// folding across *all* of that `AND`'s operands (not just the first
/// two), so n-ary conjunctions are fully distributed rather than
/// truncated to a binary one.
fn distribute_or_pair(store: &mut AstStore, a: AstId, b: AstId, ty: Type) -> Result<AstId, ResolutionError> {
    if let AstNodeKind::Connective {
        kind: ConnectiveKind::And,
        operands: and_ops,
        ..
    } = store.get(a).clone()
    {
        let mut parts = Vec::with_capacity(and_ops.len());
        for op in and_ops {
            let or_op = store.connective(ConnectiveKind::Or, vec![op, b], ty.clone());
            parts.push(distribute(store, or_op)?);
        }
        return Ok(fold_connective(store, ConnectiveKind::And, parts, ty));
    }
    if let AstNodeKind::Connective {
        kind: ConnectiveKind::And,
        operands: and_ops,
        ..
    } = store.get(b).clone()
    {
        let mut parts = Vec::with_capacity(and_ops.len());
        for op in and_ops {
            let or_op = store.connective(ConnectiveKind::Or, vec![a, op], ty.clone());
            parts.push(distribute(store, or_op)?);
        }
        return Ok(fold_connective(store, ConnectiveKind::And, parts, ty));
    }
    Ok(store.connective(ConnectiveKind::Or, vec![a, b], ty))
}

/// Step 6: distribute `OR` over `AND` until the formula is in CNF.
fn distribute(store: &mut AstStore, id: AstId) -> Result<AstId, ResolutionError> {
    let node = store.get(id).clone();
    match node {
        AstNodeKind::Constant { .. } | AstNodeKind::Variable { .. } | AstNodeKind::Application { .. } => Ok(id),
        AstNodeKind::Connective {
            kind: ConnectiveKind::Not,
            operands,
            ty,
        } => Ok(store.connective(ConnectiveKind::Not, vec![distribute(store, operands[0])?], ty)),
        AstNodeKind::Connective {
            kind: ConnectiveKind::And,
            operands,
            ty,
        } => {
            let mut parts = Vec::with_capacity(operands.len());
            for o in operands {
                parts.push(distribute(store, o)?);
            }
            Ok(fold_connective(store, ConnectiveKind::And, parts, ty))
        }
        AstNodeKind::Connective {
            kind: ConnectiveKind::Or,
            operands,
            ty,
        } => {
            let mut distributed = Vec::with_capacity(operands.len());
            for o in operands {
                distributed.push(distribute(store, o)?);
            }
            let mut iter = distributed.into_iter();
            let mut acc = iter.next().expect("Or always has at least one operand");
            for next in iter {
                acc = distribute_or_pair(store, acc, next, ty.clone())?;
            }
            Ok(acc)
        }
        AstNodeKind::Connective { .. } => Err(ResolutionError::UnsupportedConstruct(
            "non-NNF connective reached distribution".to_string(),
        )),
        AstNodeKind::Quantifier { .. } | AstNodeKind::ModalOp { .. } => Err(ResolutionError::UnsupportedConstruct(
            "quantifier or modal operator survived CNF conversion".to_string(),
        )),
    }
}

/// Step 7: split the top-level conjunction into clauses, each a set of
/// literals.
fn extract_clauses(store: &AstStore, id: AstId, out: &mut Vec<BTreeSet<Literal>>) {
    match store.get(id) {
        AstNodeKind::Connective {
            kind: ConnectiveKind::And,
            operands,
            ..
        } => {
            let operands = operands.clone();
            for o in operands {
                extract_clauses(store, o, out);
            }
        }
        _ => {
            let mut set = BTreeSet::new();
            extract_literals(store, id, &mut set);
            out.push(set);
        }
    }
}

fn extract_literals(store: &AstStore, id: AstId, set: &mut BTreeSet<Literal>) {
    match store.get(id) {
        AstNodeKind::Connective {
            kind: ConnectiveKind::Or,
            operands,
            ..
        } => {
            let operands = operands.clone();
            for o in operands {
                extract_literals(store, o, set);
            }
        }
        AstNodeKind::Connective {
            kind: ConnectiveKind::Not,
            operands,
            ..
        } => {
            set.insert(Literal::negative(operands[0]));
        }
        _ => {
            set.insert(Literal::positive(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_ast::{AstStore, QuantifierKind};
    use reasoning_base::IdGen;

    fn mortal_socrates(store: &mut AstStore) -> AstId {
        // forall x. Human(x) -> Mortal(x), applied goal Human(socrates) -> Mortal(socrates)
        let human = store.intern("Human");
        let mortal = store.intern("Mortal");
        let x_name = store.intern("x");
        let person_ty = Type::Atomic(store.intern("Person"));
        let pred_ty = Type::Function(vec![person_ty.clone()], Box::new(Type::Boolean));

        let human_fn = store.constant(human, None, pred_ty.clone());
        let mortal_fn = store.constant(mortal, None, pred_ty);
        let x = store.variable(x_name, 1, person_ty.clone());
        let human_x = store.application(human_fn, vec![x], Type::Boolean);
        let mortal_x = store.application(mortal_fn, vec![x], Type::Boolean);
        let implication = store.connective(ConnectiveKind::Implies, vec![human_x, mortal_x], Type::Boolean);
        store.quantifier(QuantifierKind::ForAll, vec![1], implication, Type::Boolean)
    }

    #[test]
    fn converts_universal_implication_to_a_single_clause() {
        let mut store = AstStore::new();
        let mut id_gen = IdGen::new();
        let formula = mortal_socrates(&mut store);

        let clauses = to_cnf_clauses(&mut store, &mut id_gen, formula).expect("cnf conversion");
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].len(), 2);
        assert!(clauses[0].iter().any(|l| !l.positive));
        assert!(clauses[0].iter().any(|l| l.positive));
    }

    #[test]
    fn skolemizes_existential_under_universal_with_a_function() {
        let mut store = AstStore::new();
        let mut id_gen = IdGen::new();
        let loves = store.intern("Loves");
        let person_ty = Type::Atomic(store.intern("Person"));
        let pred_ty = Type::Function(vec![person_ty.clone(), person_ty.clone()], Box::new(Type::Boolean));
        let loves_fn = store.constant(loves, None, pred_ty);
        let x_name = store.intern("x");
        let y_name = store.intern("y");
        let x = store.variable(x_name, 1, person_ty.clone());
        let y = store.variable(y_name, 2, person_ty.clone());
        let loves_xy = store.application(loves_fn, vec![x, y], Type::Boolean);
        let exists_y = store.quantifier(QuantifierKind::Exists, vec![2], loves_xy, Type::Boolean);
        let forall_x = store.quantifier(QuantifierKind::ForAll, vec![1], exists_y, Type::Boolean);

        let clauses = to_cnf_clauses(&mut store, &mut id_gen, forall_x).expect("cnf conversion");
        assert_eq!(clauses.len(), 1);
        let literal = clauses[0].iter().next().unwrap();
        match store.get(literal.atom) {
            AstNodeKind::Application { args, .. } => match store.get(args[1]) {
                AstNodeKind::Application { .. } => {}
                other => panic!("expected skolem function application, got {:?}", other),
            },
            other => panic!("expected application literal, got {:?}", other),
        }
    }
}
