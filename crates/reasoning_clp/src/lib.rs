//! SLD resolution interleaved with finite-domain constraint propagation
//! and labeling.
//!
//! [`ClpProver`] answers a goal `G` given context `Γ` by splitting `Γ`
//! into ordinary Horn clauses, standalone constraint facts, and explicit
//! `Domain(...)` declarations; resolving `G`'s goals against the clauses
//! while propagating constraints to a fixed point at every step; and,
//! once no logic goals remain, labeling whatever variables are still
//! non-singleton. The first full labeling found is returned.

pub mod constraint;
pub mod constraint_store;
pub mod domain;
pub mod domain_store;
pub mod error;
pub mod labeling;
pub mod program;
pub mod sld;

use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use reasoning_ast::{AstId, AstNodeKind, AstStore, ProofObject, Prover, ResourceLimits};
use reasoning_base::IdGen;

use constraint_store::ConstraintStore;
use domain_store::DomainStore;
use labeling::{ValueOrder, VariableSelection};
use program::ProgramClause;

#[derive(Debug, Default)]
pub struct ClpProver;

impl ClpProver {
    pub fn new() -> Self {
        ClpProver
    }

    fn strategies(resources: &ResourceLimits) -> (VariableSelection, ValueOrder) {
        let var_strategy = resources.get_additional("variable_selection").map(VariableSelection::parse).unwrap_or(VariableSelection::Default);
        let value_order = resources.get_additional("value_order").map(ValueOrder::parse).unwrap_or(ValueOrder::Min);
        (var_strategy, value_order)
    }
}

/// `true` if `id` is, or contains, an application of a recognized
/// constraint or domain-declaration predicate.
pub fn contains_constraint_predicate(store: &AstStore, id: AstId) -> bool {
    if program::is_constraint(store, id) || program::is_domain_decl(store, id) {
        return true;
    }
    match store.get(id) {
        AstNodeKind::Connective { operands, .. } => operands.iter().any(|&o| contains_constraint_predicate(store, o)),
        AstNodeKind::Application { args, .. } => args.iter().any(|&a| contains_constraint_predicate(store, a)),
        AstNodeKind::Quantifier { scope, .. } => contains_constraint_predicate(store, *scope),
        _ => false,
    }
}

/// Splits `context` into program clauses, and folds the domain
/// declarations and standalone constraint facts it also contains
/// straight into the initial domain/constraint stores.
fn build_program(store: &AstStore, context: &BTreeSet<AstId>) -> (Vec<ProgramClause>, DomainStore, ConstraintStore) {
    let mut clauses = Vec::new();
    let mut domains = DomainStore::new();
    let mut constraints = ConstraintStore::new();

    for &member in context {
        if let Some(decl) = program::parse_domain_decl(store, member) {
            domains.set(decl.var, domain::Domain::Values(decl.values));
            continue;
        }
        if program::is_constraint(store, member) {
            constraints.push(program::parse_constraint(store, member));
            continue;
        }
        clauses.push(program::parse_clause(store, member));
    }

    (clauses, domains, constraints)
}

impl Prover for ClpProver {
    fn prove(&self, store: &mut AstStore, goal: AstId, context: &BTreeSet<AstId>, resources: &ResourceLimits) -> ProofObject {
        let start = Instant::now();
        let (clauses, domains, constraints) = build_program(store, context);
        let query = program::parse_query(store, goal);

        let mut domains = domains;
        let mut constraints = constraints;
        constraints.extend(query.constraints);

        let (var_strategy, value_order) = Self::strategies(resources);
        let max_depth = resources.depth_limit.unwrap_or(1_000);
        let mut id_gen = IdGen::new();

        let outcome = sld::solve(
            store,
            &mut id_gen,
            &clauses,
            query.goals,
            domains.clone(),
            constraints.clone(),
            var_strategy,
            value_order,
            resources.time_limit_ms,
            max_depth,
        );

        let mut resource_counters = std::collections::BTreeMap::new();
        resource_counters.insert("variables".to_string(), domains.variables().count() as f64);
        resource_counters.insert("constraints".to_string(), constraints.iter().count() as f64);

        match outcome {
            Ok(Some(solution)) => ProofObject::success(
                goal,
                Some(solution.bindings),
                solution.steps,
                context.clone(),
                "clp_module",
                start.elapsed().as_millis() as u64,
                resource_counters,
            ),
            Ok(None) => ProofObject::failure("Failed: No solution found", "clp_module", start.elapsed().as_millis() as u64, resource_counters),
            Err(e) => ProofObject::failure(format!("Failed: {e}"), "clp_module", start.elapsed().as_millis() as u64, resource_counters),
        }
    }

    fn can_handle(&self, store: &AstStore, goal: AstId, context: &BTreeSet<AstId>) -> bool {
        contains_constraint_predicate(store, goal) || context.iter().any(|&c| contains_constraint_predicate(store, c))
    }

    fn name(&self) -> &str {
        "clp_module"
    }

    fn capabilities(&self) -> HashMap<&'static str, bool> {
        let mut caps = HashMap::new();
        caps.insert("constraint_solving", true);
        caps.insert("arithmetic", true);
        caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_ast::{ConnectiveKind, Literal, Type};

    fn app(store: &mut AstStore, name: &str, args: Vec<AstId>, ty: Type) -> AstId {
        let sym = store.intern(name);
        let op = store.constant(sym, None, Type::Function(args.iter().map(|_| Type::Integer).collect(), Box::new(ty.clone())));
        store.application(op, args, ty)
    }

    fn int_const(store: &mut AstStore, n: &str, v: i64) -> AstId {
        let sym = store.intern(n);
        store.constant(sym, Some(Literal::Int(v)), Type::Integer)
    }

    #[test]
    fn solves_a_simple_arithmetic_constraint() {
        let mut store = AstStore::new();
        let x_name = store.intern("x");
        let x = store.variable(x_name, 1, Type::Integer);
        let five = int_const(&mut store, "5", 5);
        let lt = app(&mut store, "<", vec![x, five], Type::Boolean);

        let prover = ClpProver::new();
        let context = BTreeSet::new();
        let result = prover.prove(&mut store, lt, &context, &ResourceLimits::new());

        assert!(result.achieved);
        let bindings = result.bindings.expect("bindings present");
        let bound = bindings.get(&1).expect("x bound");
        match store.get(*bound) {
            AstNodeKind::Constant { value: Some(Literal::Int(v)), .. } => assert!(*v < 5),
            other => panic!("unexpected binding: {other:?}"),
        }
    }

    #[test]
    fn can_handle_requires_a_constraint_or_domain_predicate() {
        let mut store = AstStore::new();
        let x_name = store.intern("x");
        let x = store.variable(x_name, 1, Type::Integer);
        let p = app(&mut store, "P", vec![x], Type::Boolean);

        let prover = ClpProver::new();
        let context = BTreeSet::new();
        assert!(!prover.can_handle(&store, p, &context));

        let five = int_const(&mut store, "5", 5);
        let lt = app(&mut store, "<", vec![x, five], Type::Boolean);
        assert!(prover.can_handle(&store, lt, &context));
    }

    #[test]
    fn fails_when_constraints_are_unsatisfiable() {
        let mut store = AstStore::new();
        let x_name = store.intern("x");
        let x = store.variable(x_name, 1, Type::Integer);
        let five = int_const(&mut store, "5", 5);
        let lt = app(&mut store, "<", vec![x, five], Type::Boolean);
        let ge = app(&mut store, ">=", vec![x, five], Type::Boolean);
        let goal = store.connective(ConnectiveKind::And, vec![lt, ge], Type::Boolean);

        let prover = ClpProver::new();
        let context = BTreeSet::new();
        let result = prover.prove(&mut store, goal, &context, &ResourceLimits::new());
        assert!(!result.achieved);
    }

    #[test]
    fn resolves_a_goal_through_a_program_clause() {
        let mut store = AstStore::new();
        let x_name = store.intern("x");
        let x = store.variable(x_name, 1, Type::Integer);

        let five = int_const(&mut store, "5", 5);
        let lt = app(&mut store, "<", vec![x, five], Type::Boolean);
        let small = app(&mut store, "Small", vec![x], Type::Boolean);
        let rule = store.connective(ConnectiveKind::Implies, vec![lt, small], Type::Boolean);

        let mut context = BTreeSet::new();
        context.insert(rule);

        let prover = ClpProver::new();
        let result = prover.prove(&mut store, small, &context, &ResourceLimits::new());
        assert!(result.achieved);
    }

    #[test]
    fn undefined_predicate_goal_is_satisfied_by_declaring_its_variables() {
        let mut store = AstStore::new();
        let tv_name = store.intern("Tv");
        let tv = store.variable(tv_name, 1, Type::Integer);
        let time_name = store.intern("tv_time");
        let time = store.variable(time_name, 2, Type::Integer);
        let scheduled = app(&mut store, "ScheduledAt", vec![tv, time], Type::Boolean);

        let prover = ClpProver::new();
        let context = BTreeSet::new();
        let result = prover.prove(&mut store, scheduled, &context, &ResourceLimits::new());
        assert!(result.achieved);
    }
}
