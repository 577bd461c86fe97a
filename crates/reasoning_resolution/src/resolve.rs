//! Binary resolution with set-of-support and duplicate-resolvent
//! subsumption.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::time::Instant;

use reasoning_ast::{apply, unify, AstId, AstStore, ProofObject, ProofStep, ResourceLimits, Substitution, VarId};
use reasoning_base::IdGen;

use crate::clause::{Clause, ClauseSource, Literal};
use crate::error::ResolutionError;

/// Renames every variable occurring in a literal set to fresh IDs,
/// returning the renamed literals.
///
/// Each call to [`resolve_pair`] renames both operand clauses with a
/// distinct prefix-free generator so that a shared variable ID between
/// two otherwise-unrelated clauses never accidentally unifies.
fn rename_apart(store: &mut AstStore, id_gen: &mut IdGen, literals: &BTreeSet<Literal>) -> BTreeSet<Literal> {
    let mut seen: HashMap<VarId, AstId> = HashMap::new();
    let mut renamed = BTreeSet::new();
    for literal in literals {
        collect_fresh_vars(store, id_gen, literal.atom, &mut seen);
    }
    let sub: Substitution = seen;
    for literal in literals {
        let new_atom = apply(store, &sub, literal.atom);
        renamed.insert(Literal {
            atom: new_atom,
            positive: literal.positive,
        });
    }
    renamed
}

fn collect_fresh_vars(store: &mut AstStore, id_gen: &mut IdGen, id: AstId, seen: &mut HashMap<VarId, AstId>) {
    use reasoning_ast::AstNodeKind;
    let node = store.get(id).clone();
    match node {
        AstNodeKind::Constant { .. } => {}
        AstNodeKind::Variable { name, id: v, ty } => {
            if !seen.contains_key(&v) {
                let fresh = id_gen.next();
                let fresh_node = store.variable(name, fresh, ty);
                seen.insert(v, fresh_node);
            }
        }
        AstNodeKind::Application { operator, args, .. } => {
            collect_fresh_vars(store, id_gen, operator, seen);
            for a in args {
                collect_fresh_vars(store, id_gen, a, seen);
            }
        }
        AstNodeKind::Connective { operands, .. } => {
            for o in operands {
                collect_fresh_vars(store, id_gen, o, seen);
            }
        }
        AstNodeKind::Quantifier { scope, .. } => collect_fresh_vars(store, id_gen, scope, seen),
        AstNodeKind::ModalOp { agent, proposition, .. } => {
            if let Some(a) = agent {
                collect_fresh_vars(store, id_gen, a, seen);
            }
            collect_fresh_vars(store, id_gen, proposition, seen);
        }
    }
}

/// Attempts every resolvable literal pair between `c` and `d`, returning
/// each distinct resolvent found.
fn resolve_pair(store: &mut AstStore, id_gen: &mut IdGen, c: &BTreeSet<Literal>, d: &BTreeSet<Literal>) -> Vec<BTreeSet<Literal>> {
    let c = rename_apart(store, id_gen, c);
    let d = rename_apart(store, id_gen, d);
    let mut resolvents = Vec::new();

    for l in &c {
        for m in &d {
            if l.positive == m.positive {
                continue;
            }
            if let Some(sub) = unify(store, l.atom, m.atom) {
                let mut resolvent = BTreeSet::new();
                for other in c.iter().filter(|x| *x != l) {
                    resolvent.insert(Literal {
                        atom: apply(store, &sub, other.atom),
                        positive: other.positive,
                    });
                }
                for other in d.iter().filter(|x| *x != m) {
                    resolvent.insert(Literal {
                        atom: apply(store, &sub, other.atom),
                        positive: other.positive,
                    });
                }
                resolvents.push(resolvent);
            }
        }
    }
    resolvents
}

/// The outcome of a resolution search.
pub struct ResolutionResult {
    pub proof_object: ProofObject,
}

/// Runs set-of-support binary resolution to refute `negated_goal_clauses
/// ∪ context_clauses`.
///
/// `context_clauses` and `negated_goal_clauses` are literal-set clauses
/// already produced by [`crate::cnf::to_cnf_clauses`], tagged with where
/// they came from for proof-step labeling.
pub fn resolve(
    store: &mut AstStore,
    id_gen: &mut IdGen,
    goal: AstId,
    context_clauses: Vec<(BTreeSet<Literal>, ClauseSource)>,
    negated_goal_clauses: Vec<BTreeSet<Literal>>,
    resources: &ResourceLimits,
) -> Result<ResolutionResult, ResolutionError> {
    let start = Instant::now();
    let max_steps = resources.nodes_limit.unwrap_or(10_000);
    let max_time_ms = resources.time_limit_ms.unwrap_or(5_000);

    let mut all_clauses: Vec<Clause> = Vec::new();
    let mut seen_literal_sets: HashSet<BTreeSet<Literal>> = HashSet::new();
    let mut agenda: VecDeque<usize> = VecDeque::new();
    let mut next_id = 0usize;

    for (literals, source) in context_clauses {
        seen_literal_sets.insert(literals.clone());
        all_clauses.push(Clause::new(next_id, literals, Vec::new(), source));
        next_id += 1;
    }

    for literals in negated_goal_clauses {
        if seen_literal_sets.insert(literals.clone()) {
            let id = next_id;
            next_id += 1;
            all_clauses.push(Clause::new(id, literals, Vec::new(), ClauseSource::NegatedGoal));
            agenda.push_back(id);
        }
    }

    let mut steps = 0usize;
    while let Some(current_id) = agenda.pop_front() {
        if steps >= max_steps {
            return Err(ResolutionError::MaxIterations);
        }
        if start.elapsed().as_millis() as u64 >= max_time_ms {
            return Err(ResolutionError::TimeLimit);
        }
        steps += 1;

        let current = all_clauses[current_id].clone();
        let others: Vec<Clause> = all_clauses.clone();
        for other in &others {
            let resolvents = resolve_pair(store, id_gen, &current.literals, &other.literals);
            for resolvent in resolvents {
                if resolvent.is_empty() {
                    let id = next_id;
                    next_id += 1;
                    let empty_clause = Clause::new(
                        id,
                        resolvent,
                        vec![current.id, other.id],
                        ClauseSource::Resolution,
                    );
                    all_clauses.push(empty_clause);
                    let proof_object =
                        reconstruct_proof(store, &all_clauses, id, goal, start.elapsed().as_millis() as u64);
                    return Ok(ResolutionResult { proof_object });
                }
                if seen_literal_sets.insert(resolvent.clone()) {
                    let id = next_id;
                    next_id += 1;
                    all_clauses.push(Clause::new(id, resolvent, vec![current.id, other.id], ClauseSource::Resolution));
                    agenda.push_back(id);
                }
            }
        }
    }

    Err(ResolutionError::AgendaExhausted)
}

fn reconstruct_proof(store: &mut AstStore, clauses: &[Clause], empty_clause_id: usize, goal: AstId, time_ms: u64) -> ProofObject {
    let mut steps = Vec::new();
    let mut index_of: HashMap<usize, usize> = HashMap::new();
    let mut used_premises = BTreeSet::new();

    let bottom_name = store.intern("⊥");
    let bottom = store.constant(bottom_name, Some(reasoning_ast::Literal::Bool(false)), reasoning_ast::Type::Boolean);

    fn visit(
        store: &mut AstStore,
        clauses: &[Clause],
        clause_id: usize,
        bottom: AstId,
        steps: &mut Vec<ProofStep>,
        index_of: &mut HashMap<usize, usize>,
        used_premises: &mut BTreeSet<AstId>,
    ) -> usize {
        if let Some(&idx) = index_of.get(&clause_id) {
            return idx;
        }
        let clause = clauses[clause_id].clone();
        let premise_indices: Vec<usize> = clause
            .parents
            .iter()
            .map(|&p| visit(store, clauses, p, bottom, steps, index_of, used_premises))
            .collect();

        let rule_name = match clause.source {
            ClauseSource::Context(_) => "Premise",
            ClauseSource::NegatedGoal => "NegatedGoal",
            ClauseSource::Resolution => "Resolution",
        };

        let formula = clause.literals.iter().next().map(|l| l.atom).unwrap_or(bottom);
        if premise_indices.is_empty() {
            used_premises.insert(formula);
        }
        let step = ProofStep::new(formula, rule_name, premise_indices);
        let idx = steps.len();
        steps.push(step);
        index_of.insert(clause_id, idx);
        idx
    }

    visit(
        store,
        clauses,
        empty_clause_id,
        bottom,
        &mut steps,
        &mut index_of,
        &mut used_premises,
    );

    let conclusion = goal;

    let mut resources = BTreeMap::new();
    resources.insert("nodes_explored".to_string(), clauses.len() as f64);

    ProofObject::success(
        conclusion,
        None,
        steps,
        used_premises,
        "resolution_prover",
        time_ms,
        resources,
    )
}
