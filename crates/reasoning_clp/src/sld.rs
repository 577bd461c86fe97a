//! CLP-style SLD resolution: goal-directed clause selection interleaved
//! with finite-domain constraint propagation and, once the logic goals
//! are exhausted, labeling.
//!
//! A goal whose predicate never appears as any clause's head is treated
//! as a bare variable declaration rather than a failure: the scheduling-
//! style goals this module is built for (`ScheduledAt(Tv, tv_time)`, with
//! no `ScheduledAt` rule in the program) exist only to say "these
//! variables must be labeled", not to be resolved against a knowledge
//! base. A goal whose predicate *is* defined, but that fails to unify
//! with any clause head, is a genuine SLD failure.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;

use reasoning_ast::{apply, unify, AstId, AstNodeKind, AstStore, Literal, ProofStep, Substitution, Type, VarId};
use reasoning_base::{IdGen, Symbol};

use crate::constraint::{Constraint, Operand};
use crate::constraint_store::ConstraintStore;
use crate::domain::{Domain, DomainValue};
use crate::domain_store::DomainStore;
use crate::error::ClpError;
use crate::labeling::{self, ValueOrder, VariableSelection};
use crate::program::ProgramClause;

/// A successful SLD + labeling outcome: every query variable bound to a
/// singleton domain value, plus the proof steps taken to reach it.
pub struct Solution {
    pub bindings: BTreeMap<VarId, AstId>,
    pub steps: Vec<ProofStep>,
}

struct Budget {
    start: Instant,
    time_limit_ms: Option<u64>,
    max_depth: usize,
}

impl Budget {
    fn check(&self, depth: usize) -> Result<(), ClpError> {
        if depth > self.max_depth {
            return Err(ClpError::MaxDepth);
        }
        if let Some(limit) = self.time_limit_ms {
            if self.start.elapsed().as_millis() as u64 >= limit {
                return Err(ClpError::TimeLimit);
            }
        }
        Ok(())
    }
}

fn predicate_symbol(store: &AstStore, id: AstId) -> Option<Symbol> {
    match store.get(id) {
        AstNodeKind::Application { operator, .. } => match store.get(*operator) {
            AstNodeKind::Constant { name, .. } => Some(*name),
            _ => None,
        },
        _ => None,
    }
}

/// Renames every variable in a clause (head, goals, and constraints) to
/// fresh IDs, so that two activations of the same clause within one
/// search never alias each other's local variables.
fn rename_clause_apart(store: &mut AstStore, id_gen: &mut IdGen, clause: &ProgramClause) -> ProgramClause {
    let mut ast_sub: Substitution = HashMap::new();
    let mut var_map: HashMap<VarId, VarId> = HashMap::new();

    collect_fresh(store, id_gen, clause.head, &mut ast_sub, &mut var_map);
    for &g in &clause.goals {
        collect_fresh(store, id_gen, g, &mut ast_sub, &mut var_map);
    }
    for c in &clause.constraints {
        for v in c.variables() {
            var_map.entry(v).or_insert_with(|| id_gen.next());
        }
    }

    let new_head = apply(store, &ast_sub, clause.head);
    let new_goals = clause.goals.iter().map(|&g| apply(store, &ast_sub, g)).collect();
    let new_constraints = clause.constraints.iter().map(|c| remap_constraint(c, &var_map)).collect();

    ProgramClause {
        head: new_head,
        goals: new_goals,
        constraints: new_constraints,
    }
}

fn collect_fresh(store: &mut AstStore, id_gen: &mut IdGen, id: AstId, ast_sub: &mut Substitution, var_map: &mut HashMap<VarId, VarId>) {
    let node = store.get(id).clone();
    match node {
        AstNodeKind::Constant { .. } => {}
        AstNodeKind::Variable { name, id: v, ty } => {
            if !var_map.contains_key(&v) {
                let fresh = id_gen.next();
                var_map.insert(v, fresh);
                let fresh_node = store.variable(name, fresh, ty);
                ast_sub.insert(v, fresh_node);
            }
        }
        AstNodeKind::Application { operator, args, .. } => {
            collect_fresh(store, id_gen, operator, ast_sub, var_map);
            for a in args {
                collect_fresh(store, id_gen, a, ast_sub, var_map);
            }
        }
        AstNodeKind::Connective { operands, .. } => {
            for o in operands {
                collect_fresh(store, id_gen, o, ast_sub, var_map);
            }
        }
        AstNodeKind::Quantifier { scope, .. } => collect_fresh(store, id_gen, scope, ast_sub, var_map),
        AstNodeKind::ModalOp { agent, proposition, .. } => {
            if let Some(a) = agent {
                collect_fresh(store, id_gen, a, ast_sub, var_map);
            }
            collect_fresh(store, id_gen, proposition, ast_sub, var_map);
        }
    }
}

fn remap_constraint(c: &Constraint, var_map: &HashMap<VarId, VarId>) -> Constraint {
    let remap_operand = |op: &Operand| match op {
        Operand::Var(v) => Operand::Var(*var_map.get(v).unwrap_or(v)),
        Operand::Const(c) => Operand::Const(*c),
    };
    match c {
        Constraint::Eq(a, b) => Constraint::Eq(remap_operand(a), remap_operand(b)),
        Constraint::Neq(a, b) => Constraint::Neq(remap_operand(a), remap_operand(b)),
        Constraint::Lt(a, b) => Constraint::Lt(remap_operand(a), remap_operand(b)),
        Constraint::Le(a, b) => Constraint::Le(remap_operand(a), remap_operand(b)),
        Constraint::Gt(a, b) => Constraint::Gt(remap_operand(a), remap_operand(b)),
        Constraint::Ge(a, b) => Constraint::Ge(remap_operand(a), remap_operand(b)),
        Constraint::AllDifferent(vars) => Constraint::AllDifferent(vars.iter().map(|v| *var_map.get(v).unwrap_or(v)).collect()),
        Constraint::SumEquals(vars, target) => Constraint::SumEquals(vars.iter().map(|v| *var_map.get(v).unwrap_or(v)).collect(), *target),
    }
}

/// Folds a unifier's variable bindings into the domain/constraint stores,
/// so that a logic-level binding (`x` bound to a constant, or to another
/// variable) immediately narrows finite domains too. Returns `false` if
/// a binding is immediately inconsistent with the current domains.
fn bind_into_domains(store: &AstStore, domains: &mut DomainStore, constraints: &mut ConstraintStore, sub: &Substitution) -> bool {
    for (&var, &term) in sub {
        match store.get(term) {
            AstNodeKind::Variable { id: other, .. } => {
                constraints.push(Constraint::Eq(Operand::Var(var), Operand::Var(*other)));
            }
            AstNodeKind::Constant { value: Some(Literal::Int(i)), .. } => {
                if !domains.intersect(var, &Domain::singleton_range(*i)) {
                    return false;
                }
            }
            AstNodeKind::Constant { .. } => {
                if !domains.intersect(var, &Domain::Values(std::iter::once(term).collect())) {
                    return false;
                }
            }
            _ => {
                // Compound terms carry no finite-domain meaning; the
                // binding still holds at the logic level via substitution.
            }
        }
    }
    true
}

/// Variables whose domain must end up a singleton for a solution to
/// count: those mentioned directly in the original query, before any
/// clause expansion introduces its own local variables.
fn collect_query_variables(store: &AstStore, ids: &[AstId], out: &mut HashSet<VarId>) {
    for &id in ids {
        walk_variables(store, id, out);
    }
}

fn walk_variables(store: &AstStore, id: AstId, out: &mut HashSet<VarId>) {
    match store.get(id) {
        AstNodeKind::Constant { .. } => {}
        AstNodeKind::Variable { id: v, .. } => {
            out.insert(*v);
        }
        AstNodeKind::Application { operator, args, .. } => {
            walk_variables(store, *operator, out);
            for &a in args {
                walk_variables(store, a, out);
            }
        }
        AstNodeKind::Connective { operands, .. } => {
            for &o in operands {
                walk_variables(store, o, out);
            }
        }
        AstNodeKind::Quantifier { scope, .. } => walk_variables(store, *scope, out),
        AstNodeKind::ModalOp { agent, proposition, .. } => {
            if let Some(a) = agent {
                walk_variables(store, *a, out);
            }
            walk_variables(store, *proposition, out);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn label(
    domains: &DomainStore,
    constraints: &ConstraintStore,
    store: &mut AstStore,
    var_strategy: VariableSelection,
    value_order: ValueOrder,
    budget: &Budget,
    depth: usize,
    steps: &mut Vec<ProofStep>,
) -> Result<Option<DomainStore>, ClpError> {
    budget.check(depth)?;

    let Some(var) = labeling::select_variable(domains, var_strategy) else {
        return Ok(Some(domains.clone()));
    };

    let domain = domains.get(var).cloned().unwrap_or_else(Domain::default_range);
    match &domain {
        Domain::Range { .. } => {
            for value in labeling::candidate_values(&domain, value_order) {
                let mut trial = domains.clone();
                if !trial.intersect(var, &Domain::singleton_range(value)) {
                    continue;
                }
                if !constraints.propagate_fixed_point(&mut trial) {
                    continue;
                }
                let name = store.intern(&format!("x{var}"));
                let const_id = store.constant(name, Some(Literal::Int(value)), Type::Integer);
                steps.push(ProofStep::new(const_id, "Label", vec![]).with_explanation(format!("?{var} := {value}")));
                if let Some(found) = label(&trial, constraints, store, var_strategy, value_order, budget, depth + 1, steps)? {
                    return Ok(Some(found));
                }
                steps.pop();
            }
        }
        Domain::Values(_) => {
            for value in labeling::candidate_value_ids(&domain) {
                let mut trial = domains.clone();
                if !trial.intersect(var, &Domain::Values(std::iter::once(value).collect())) {
                    continue;
                }
                if !constraints.propagate_fixed_point(&mut trial) {
                    continue;
                }
                steps.push(ProofStep::new(value, "Label", vec![]).with_explanation(format!("?{var} := {}", store.display(value))));
                if let Some(found) = label(&trial, constraints, store, var_strategy, value_order, budget, depth + 1, steps)? {
                    return Ok(Some(found));
                }
                steps.pop();
            }
        }
    }
    Ok(None)
}

/// Runs the SLD + constraint-propagation + labeling search described in
/// the module docs, returning the first solution found, if any.
#[allow(clippy::too_many_arguments)]
pub fn solve(
    store: &mut AstStore,
    id_gen: &mut IdGen,
    clauses: &[ProgramClause],
    goals: Vec<AstId>,
    mut domains: DomainStore,
    mut constraints: ConstraintStore,
    var_strategy: VariableSelection,
    value_order: ValueOrder,
    time_limit_ms: Option<u64>,
    max_depth: usize,
) -> Result<Option<Solution>, ClpError> {
    let defined_predicates: HashSet<Symbol> = clauses.iter().filter_map(|c| predicate_symbol(store, c.head)).collect();

    let mut query_vars = HashSet::new();
    collect_query_variables(store, &goals, &mut query_vars);
    for constraint in constraints.iter() {
        for v in constraint.variables() {
            query_vars.insert(v);
        }
    }
    for &v in &query_vars {
        domains.ensure(v);
    }

    if !constraints.propagate_fixed_point(&mut domains) {
        return Ok(None);
    }

    let budget = Budget {
        start: Instant::now(),
        time_limit_ms,
        max_depth,
    };
    let mut steps = Vec::new();

    let found = resolve_goals(store, id_gen, clauses, &defined_predicates, goals, domains, constraints, &budget, 0, &mut steps)?;

    let Some((final_domains, final_constraints)) = found else {
        return Ok(None);
    };

    let labeled = label(&final_domains, &final_constraints, store, var_strategy, value_order, &budget, 0, &mut steps)?;
    let Some(domains) = labeled else { return Ok(None) };

    let mut bindings = BTreeMap::new();
    for &var in &query_vars {
        match domains.get(var).and_then(Domain::singleton_value) {
            Some(DomainValue::Int(i)) => {
                let name = store.intern(&format!("x{var}"));
                bindings.insert(var, store.constant(name, Some(Literal::Int(i)), Type::Integer));
            }
            Some(DomainValue::Ast(id)) => {
                bindings.insert(var, id);
            }
            None => return Ok(None),
        }
    }

    Ok(Some(Solution { bindings, steps }))
}

/// Resolves the remaining `goals` against `clauses`, propagating domain
/// constraints at every step, returning the resulting [`DomainStore`] on
/// success (labeling happens separately, once all goals are resolved).
#[allow(clippy::too_many_arguments)]
fn resolve_goals(
    store: &mut AstStore,
    id_gen: &mut IdGen,
    clauses: &[ProgramClause],
    defined_predicates: &HashSet<Symbol>,
    mut goals: Vec<AstId>,
    domains: DomainStore,
    constraints: ConstraintStore,
    budget: &Budget,
    depth: usize,
    steps: &mut Vec<ProofStep>,
) -> Result<Option<(DomainStore, ConstraintStore)>, ClpError> {
    budget.check(depth)?;

    let Some(goal) = goals.pop() else {
        return Ok(Some((domains, constraints)));
    };

    let predicate = predicate_symbol(store, goal);
    let is_defined = predicate.is_some_and(|p| defined_predicates.contains(&p));

    if !is_defined {
        // Undefined predicate: treated as a bare variable declaration,
        // not a sub-goal to resolve (see module docs).
        let mut vars = HashSet::new();
        walk_variables(store, goal, &mut vars);
        let mut domains = domains;
        for v in vars {
            domains.ensure(v);
        }
        steps.push(ProofStep::new(goal, "AssumeDeclared", vec![]));
        return resolve_goals(store, id_gen, clauses, defined_predicates, goals, domains, constraints, budget, depth + 1, steps);
    }

    for clause in clauses {
        if predicate_symbol(store, clause.head) != predicate {
            continue;
        }
        let instance = rename_clause_apart(store, id_gen, clause);
        let Some(sub) = unify(store, goal, instance.head) else {
            continue;
        };

        let mut trial_domains = domains.clone();
        let mut trial_constraints = constraints.clone();
        for c in &instance.constraints {
            for v in c.variables() {
                trial_domains.ensure(v);
            }
        }
        if !bind_into_domains(store, &mut trial_domains, &mut trial_constraints, &sub) {
            continue;
        }

        trial_constraints.extend(instance.constraints.clone());

        let mut remaining: Vec<AstId> = goals.iter().map(|&g| apply(store, &sub, g)).collect();
        for &g in instance.goals.iter().rev() {
            remaining.push(apply(store, &sub, g));
        }

        if !trial_constraints.propagate_fixed_point(&mut trial_domains) {
            continue;
        }

        steps.push(ProofStep::new(goal, "SLDResolve", vec![]).with_explanation(format!("resolved against {}", store.display(instance.head))));
        if let Some(result) = resolve_goals(store, id_gen, clauses, defined_predicates, remaining, trial_domains, trial_constraints, budget, depth + 1, steps)? {
            return Ok(Some(result));
        }
        steps.pop();
    }

    Ok(None)
}
