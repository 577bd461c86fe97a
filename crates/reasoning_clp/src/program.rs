//! Splitting a context and a goal into Horn clauses, constraints, and
//! explicit domain declarations.

use std::collections::BTreeSet;

use reasoning_ast::{AstId, AstNodeKind, AstStore, ConnectiveKind, Literal, VarId};

use crate::constraint::{Constraint, Operand};
use crate::domain::Domain;

/// One program clause: `head :- goals, constraints.` A fact is a clause
/// with no goals and no constraints.
#[derive(Debug, Clone)]
pub struct ProgramClause {
    pub head: AstId,
    pub goals: Vec<AstId>,
    pub constraints: Vec<Constraint>,
}

/// A parsed query: the ordinary goals to resolve and the constraints to
/// register up front.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub goals: Vec<AstId>,
    pub constraints: Vec<Constraint>,
}

/// An explicit `Domain(var, v1, v2, ...)` fact, declaring a finite set of
/// symbolic values for a variable rather than the default integer range.
#[derive(Debug, Clone)]
pub struct DomainDecl {
    pub var: VarId,
    pub values: BTreeSet<AstId>,
}

const CONSTRAINT_PREDICATES: &[&str] = &["=", "!=", "<", "<=", ">", ">=", "AllDifferent", "SumEquals"];
const DOMAIN_PREDICATE: &str = "Domain";

/// Returns the predicate name of an `Application` node's operator, if its
/// operator is a plain `Constant` (every predicate used by this module is).
fn predicate_name<'a>(store: &'a AstStore, id: AstId) -> Option<&'a str> {
    match store.get(id) {
        AstNodeKind::Application { operator, .. } => match store.get(*operator) {
            AstNodeKind::Constant { name, .. } => Some(store.resolve(*name)),
            _ => None,
        },
        _ => None,
    }
}

/// `true` if `id` is a recognized constraint predicate application.
pub fn is_constraint(store: &AstStore, id: AstId) -> bool {
    predicate_name(store, id).is_some_and(|n| CONSTRAINT_PREDICATES.contains(&n))
}

pub fn is_domain_decl(store: &AstStore, id: AstId) -> bool {
    predicate_name(store, id) == Some(DOMAIN_PREDICATE)
}

fn operand_of(store: &AstStore, id: AstId) -> Operand {
    match store.get(id) {
        AstNodeKind::Constant { value: Some(Literal::Int(i)), .. } => Operand::Const(*i),
        AstNodeKind::Variable { id: var, .. } => Operand::Var(*var),
        _ => Operand::Var(u64::MAX), // unresolved: treated as an always-free variable
    }
}

/// Converts a recognized constraint-predicate application into a
/// [`Constraint`]. Panics if `id` is not [`is_constraint`].
pub fn parse_constraint(store: &AstStore, id: AstId) -> Constraint {
    let name = predicate_name(store, id).expect("parse_constraint requires a constraint predicate");
    let args = match store.get(id) {
        AstNodeKind::Application { args, .. } => args.clone(),
        _ => unreachable!(),
    };
    match name {
        "=" => Constraint::Eq(operand_of(store, args[0]), operand_of(store, args[1])),
        "!=" => Constraint::Neq(operand_of(store, args[0]), operand_of(store, args[1])),
        "<" => Constraint::Lt(operand_of(store, args[0]), operand_of(store, args[1])),
        "<=" => Constraint::Le(operand_of(store, args[0]), operand_of(store, args[1])),
        ">" => Constraint::Gt(operand_of(store, args[0]), operand_of(store, args[1])),
        ">=" => Constraint::Ge(operand_of(store, args[0]), operand_of(store, args[1])),
        "AllDifferent" => Constraint::AllDifferent(
            args.iter()
                .filter_map(|&a| match store.get(a) {
                    AstNodeKind::Variable { id: v, .. } => Some(*v),
                    _ => None,
                })
                .collect(),
        ),
        "SumEquals" => {
            let target = match args.last().map(|&a| store.get(a)) {
                Some(AstNodeKind::Constant { value: Some(Literal::Int(i)), .. }) => *i,
                _ => 0,
            };
            let vars = args[..args.len().saturating_sub(1)]
                .iter()
                .filter_map(|&a| match store.get(a) {
                    AstNodeKind::Variable { id: v, .. } => Some(*v),
                    _ => None,
                })
                .collect();
            Constraint::SumEquals(vars, target)
        }
        other => unreachable!("unrecognized constraint predicate: {other}"),
    }
}

pub fn parse_domain_decl(store: &AstStore, id: AstId) -> Option<DomainDecl> {
    let args = match store.get(id) {
        AstNodeKind::Application { args, .. } if !args.is_empty() => args.clone(),
        _ => return None,
    };
    let var = match store.get(args[0]) {
        AstNodeKind::Variable { id, .. } => *id,
        _ => return None,
    };
    Some(DomainDecl {
        var,
        values: args[1..].iter().copied().collect(),
    })
}

/// Splits a conjunction (or a single formula) into its top-level
/// conjuncts, descending through nested `And` nodes.
fn conjuncts(store: &AstStore, id: AstId, out: &mut Vec<AstId>) {
    match store.get(id) {
        AstNodeKind::Connective { kind: ConnectiveKind::And, operands, .. } => {
            let operands = operands.clone();
            for o in operands {
                conjuncts(store, o, out);
            }
        }
        _ => out.push(id),
    }
}

/// Parses one context member into a [`ProgramClause`], a [`DomainDecl`],
/// or neither (callers route known-constraint facts elsewhere before
/// calling this).
///
/// `Implies(body, head)` becomes a clause with `body`'s conjuncts split
/// into ordinary goals and constraints; anything else is a fact (a
/// clause with an empty body).
pub fn parse_clause(store: &AstStore, id: AstId) -> ProgramClause {
    match store.get(id) {
        AstNodeKind::Connective { kind: ConnectiveKind::Implies, operands, .. } => {
            let body = operands[0];
            let head = operands[1];
            let mut parts = Vec::new();
            conjuncts(store, body, &mut parts);
            let mut goals = Vec::new();
            let mut constraints = Vec::new();
            for part in parts {
                if is_constraint(store, part) {
                    constraints.push(parse_constraint(store, part));
                } else {
                    goals.push(part);
                }
            }
            ProgramClause { head, goals, constraints }
        }
        _ => ProgramClause { head: id, goals: vec![], constraints: vec![] },
    }
}

/// Parses a goal formula into a [`Query`], splitting its top-level
/// conjuncts into ordinary goals and registered constraints.
pub fn parse_query(store: &AstStore, goal: AstId) -> Query {
    let mut parts = Vec::new();
    conjuncts(store, goal, &mut parts);
    let mut query = Query::default();
    for part in parts {
        if is_constraint(store, part) {
            query.constraints.push(parse_constraint(store, part));
        } else {
            query.goals.push(part);
        }
    }
    query
}

/// Builds the initial per-variable domain for a set of `Domain` facts,
/// defaulting every other variable mentioned in `extra_vars` to the
/// standard integer range.
pub fn initial_domains(decls: &[DomainDecl]) -> Vec<(VarId, Domain)> {
    decls.iter().map(|d| (d.var, Domain::Values(d.values.clone()))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_ast::Type;

    fn constraint_app(store: &mut AstStore, name: &str, args: Vec<AstId>) -> AstId {
        let sym = store.intern(name);
        let op = store.constant(sym, None, Type::Boolean);
        store.application(op, args, Type::Boolean)
    }

    #[test]
    fn recognizes_comparator_predicates() {
        let mut store = AstStore::new();
        let x_name = store.intern("x");
        let x = store.variable(x_name, 1, Type::Integer);
        let five = store.constant(store.intern("5"), Some(Literal::Int(5)), Type::Integer);
        let lt = constraint_app(&mut store, "<", vec![x, five]);
        assert!(is_constraint(&store, lt));
        match parse_constraint(&store, lt) {
            Constraint::Lt(Operand::Var(1), Operand::Const(5)) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn implies_splits_body_into_goals_and_constraints() {
        let mut store = AstStore::new();
        let x_name = store.intern("x");
        let x = store.variable(x_name, 1, Type::Integer);
        let five = store.constant(store.intern("5"), Some(Literal::Int(5)), Type::Integer);
        let lt = constraint_app(&mut store, "<", vec![x, five]);

        let p_name = store.intern("P");
        let p = store.application(store.constant(p_name, None, Type::Boolean), vec![x], Type::Boolean);

        let body = store.connective(ConnectiveKind::And, vec![lt, p], Type::Boolean);
        let q_name = store.intern("Q");
        let head = store.application(store.constant(q_name, None, Type::Boolean), vec![x], Type::Boolean);
        let rule = store.connective(ConnectiveKind::Implies, vec![body, head], Type::Boolean);

        let clause = parse_clause(&store, rule);
        assert_eq!(clause.head, head);
        assert_eq!(clause.goals, vec![p]);
        assert_eq!(clause.constraints.len(), 1);
    }

    #[test]
    fn fact_is_a_headless_bodyless_clause() {
        let mut store = AstStore::new();
        let p_name = store.intern("P");
        let p = store.constant(p_name, None, Type::Boolean);
        let clause = parse_clause(&store, p);
        assert_eq!(clause.head, p);
        assert!(clause.goals.is_empty());
    }
}
