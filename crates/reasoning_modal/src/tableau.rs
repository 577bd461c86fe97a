//! The tableau: a list of branches under construction, plus the
//! worklist-driven rule-application loop.

use std::collections::VecDeque;

use reasoning_ast::AstStore;
use reasoning_base::IdGen;

use crate::branch::{Branch, SignedFormula, WorldData, WorldId};
use crate::error::TableauError;
use crate::rules::{classify, RuleKind};
use crate::system::ModalSystem;

/// One pending obligation: apply the tableau rule for `formula` as it
/// appears at `world` on `branch`.
#[derive(Debug, Clone, Copy)]
struct Task {
    branch: usize,
    world: WorldId,
    formula: SignedFormula,
}

/// Resource counters the caller can read back after a search.
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchStats {
    pub worlds_created: usize,
    pub nodes_processed: usize,
}

pub enum SearchOutcome {
    /// Every branch closed: the tableau as a whole is closed.
    Closed,
    /// At least one fully-expanded branch stayed open.
    Open,
    ResourceExhausted(TableauError),
}

/// Runs the tableau to completion (or until a resource limit trips),
/// starting from a single root branch seeded with `initial`.
///
/// Returns the outcome plus the final branch list, so the caller can
/// reconstruct a proof trace from whichever branch closed (or report
/// the open branch as a model witness).
pub fn run(
    store: &mut AstStore,
    id_gen: &mut IdGen,
    initial: Vec<SignedFormula>,
    system: ModalSystem,
    max_branches: usize,
    max_nodes: usize,
    deadline: impl Fn() -> bool,
) -> (SearchOutcome, Vec<Branch>, SearchStats) {
    let root_world = id_gen.next();
    let mut branch = Branch::new(root_world);
    let mut worklist: VecDeque<Task> = VecDeque::new();
    for sf in initial {
        if branch.worlds.get_mut(&root_world).unwrap().insert(sf) {
            worklist.push_back(Task {
                branch: 0,
                world: root_world,
                formula: sf,
            });
        }
    }
    enforce_properties(&mut branch, root_world, id_gen, system);
    branch.refresh_closed();

    let mut branches = vec![branch];
    let mut stats = SearchStats::default();

    while let Some(task) = dequeue_preferred(&mut worklist, store, &branches) {
        if branches[task.branch].closed {
            continue;
        }
        stats.nodes_processed += 1;
        if stats.nodes_processed > max_nodes {
            return (SearchOutcome::ResourceExhausted(TableauError::MaxNodes), branches, stats);
        }
        if deadline() {
            return (SearchOutcome::ResourceExhausted(TableauError::TimeLimit), branches, stats);
        }

        let already_expanded = branches[task.branch]
            .worlds
            .get(&task.world)
            .map(|w| w.expanded.contains(&task.formula))
            .unwrap_or(true);
        if already_expanded {
            continue;
        }
        branches[task.branch]
            .worlds
            .get_mut(&task.world)
            .unwrap()
            .expanded
            .insert(task.formula);

        match classify(store, task.formula) {
            RuleKind::Literal => {}
            RuleKind::Alpha(components) => {
                for sf in components {
                    let w = branches[task.branch].worlds.get_mut(&task.world).unwrap();
                    if w.insert(sf) {
                        worklist.push_back(Task {
                            branch: task.branch,
                            world: task.world,
                            formula: sf,
                        });
                    }
                }
                branches[task.branch].refresh_closed();
            }
            RuleKind::Beta(components) => {
                if branches.len() + components.len() - 1 > max_branches {
                    return (SearchOutcome::ResourceExhausted(TableauError::MaxBranches), branches, stats);
                }
                let base = branches[task.branch].clone();
                for (i, sf) in components.into_iter().enumerate() {
                    let mut clone = base.clone();
                    let inserted = clone.worlds.get_mut(&task.world).unwrap().insert(sf);
                    clone.refresh_closed();
                    let idx = if i == 0 {
                        branches[task.branch] = clone;
                        task.branch
                    } else {
                        branches.push(clone);
                        branches.len() - 1
                    };
                    if inserted {
                        worklist.push_back(Task {
                            branch: idx,
                            world: task.world,
                            formula: sf,
                        });
                    }
                }
            }
            RuleKind::Pi(inner) => {
                let targets = branches[task.branch].accessible_from(task.world);
                for w in targets {
                    let wd = branches[task.branch].worlds.entry(w).or_insert_with(WorldData::default);
                    if wd.insert(inner) {
                        worklist.push_back(Task {
                            branch: task.branch,
                            world: w,
                            formula: inner,
                        });
                    }
                }
                branches[task.branch].refresh_closed();
            }
            RuleKind::Nu(inner) => {
                let new_world = id_gen.next();
                stats.worlds_created += 1;
                branches[task.branch].worlds.insert(new_world, WorldData::default());
                branches[task.branch].add_relation(task.world, new_world);
                enforce_properties(&mut branches[task.branch], new_world, id_gen, system);
                if branches[task.branch]
                    .worlds
                    .get_mut(&new_world)
                    .unwrap()
                    .insert(inner)
                {
                    worklist.push_back(Task {
                        branch: task.branch,
                        world: new_world,
                        formula: inner,
                    });
                }
                branches[task.branch].refresh_closed();
            }
        }
    }

    if branches.iter().all(|b| b.closed) {
        (SearchOutcome::Closed, branches, stats)
    } else {
        (SearchOutcome::Open, branches, stats)
    }
}

/// Picks the next task, preferring α, then ν, then π, then β across
/// branches: non-branching rules saturate first to keep the branch count
/// down, and π is placed after ν since its effect is maximized once ν
/// has already populated the accessible worlds it propagates into.
fn dequeue_preferred(
    worklist: &mut VecDeque<Task>,
    store: &AstStore,
    branches: &[Branch],
) -> Option<Task> {
    let mut best: Option<(usize, u8)> = None;
    for (i, task) in worklist.iter().enumerate() {
        if branches[task.branch].closed {
            continue;
        }
        let rank = match classify(store, task.formula) {
            RuleKind::Alpha(_) => 0,
            RuleKind::Nu(_) => 1,
            RuleKind::Pi(_) => 2,
            RuleKind::Beta(_) => 3,
            RuleKind::Literal => 0,
        };
        if best.map(|(_, r)| rank < r).unwrap_or(true) {
            best = Some((i, rank));
        }
    }
    best.map(|(i, _)| worklist.remove(i).unwrap())
}

fn enforce_properties(branch: &mut Branch, touched: WorldId, id_gen: &mut IdGen, system: ModalSystem) {
    let props = system.properties();
    let _ = touched;

    if props.reflexive {
        let ids: Vec<WorldId> = branch.worlds.keys().copied().collect();
        for w in ids {
            branch.add_relation(w, w);
        }
    }
    if props.symmetric {
        loop {
            let missing: Vec<(WorldId, WorldId)> = branch
                .relations
                .iter()
                .filter(|(a, b)| !branch.relations.contains(&(*b, *a)))
                .map(|(a, b)| (*b, *a))
                .collect();
            if missing.is_empty() {
                break;
            }
            for (a, b) in missing {
                branch.relations.insert((a, b));
            }
        }
    }
    if props.transitive {
        loop {
            let mut added = false;
            let current: Vec<(WorldId, WorldId)> = branch.relations.iter().copied().collect();
            for &(a, b) in &current {
                for &(c, d) in &current {
                    if b == c && !branch.relations.contains(&(a, d)) {
                        branch.relations.insert((a, d));
                        added = true;
                    }
                }
            }
            if !added {
                break;
            }
        }
    }
    if props.serial {
        let without_successor: Vec<WorldId> = branch
            .worlds
            .keys()
            .copied()
            .filter(|w| !branch.relations.iter().any(|(a, _)| a == w))
            .collect();
        for w in without_successor {
            let successor = id_gen.next();
            branch.worlds.insert(successor, WorldData::default());
            branch.add_relation(w, successor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_ast::{ConnectiveKind, ModalOpKind, Type};

    #[test]
    fn reflexive_t_closes_box_p_and_not_p() {
        // T:□P, F:P at the same (reflexive) world must close: π puts P
        // into the root world itself, contradicting the F:P already there.
        let mut store = AstStore::new();
        let mut id_gen = IdGen::new();
        let p_name = store.intern("P");
        let p = store.constant(p_name, None, Type::Boolean);
        let boxed = store.modal_op(ModalOpKind::Necessary, None, p, Type::Boolean);

        let initial = vec![SignedFormula::new(boxed, true), SignedFormula::new(p, false)];
        let (outcome, _, _) = run(&mut store, &mut id_gen, initial, ModalSystem::T, 1000, 10_000, || false);
        assert!(matches!(outcome, SearchOutcome::Closed));
    }

    #[test]
    fn k_does_not_close_box_p_and_not_p() {
        // Without reflexivity, □P only constrains worlds accessible from
        // the root, never the root itself, so F:P there survives.
        let mut store = AstStore::new();
        let mut id_gen = IdGen::new();
        let p_name = store.intern("P");
        let p = store.constant(p_name, None, Type::Boolean);
        let boxed = store.modal_op(ModalOpKind::Necessary, None, p, Type::Boolean);

        let initial = vec![SignedFormula::new(boxed, true), SignedFormula::new(p, false)];
        let (outcome, _, _) = run(&mut store, &mut id_gen, initial, ModalSystem::K, 1000, 10_000, || false);
        assert!(matches!(outcome, SearchOutcome::Open));
    }

    #[test]
    fn beta_split_produces_two_branches() {
        let mut store = AstStore::new();
        let mut id_gen = IdGen::new();
        let p_name = store.intern("P");
        let q_name = store.intern("Q");
        let p = store.constant(p_name, None, Type::Boolean);
        let q = store.constant(q_name, None, Type::Boolean);
        let disj = store.connective(ConnectiveKind::Or, vec![p, q], Type::Boolean);

        let initial = vec![SignedFormula::new(disj, true)];
        let (outcome, branches, _) = run(&mut store, &mut id_gen, initial, ModalSystem::K, 1000, 10_000, || false);
        assert!(matches!(outcome, SearchOutcome::Open));
        assert_eq!(branches.len(), 2);
    }
}
