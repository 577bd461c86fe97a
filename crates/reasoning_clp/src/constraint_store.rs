//! Registered constraints and the wake-up queue that drives fixed-point
//! propagation: whenever a variable's domain narrows, every constraint
//! that mentions it is re-examined until nothing changes or a domain
//! empties out.

use std::collections::BTreeSet;

use reasoning_ast::VarId;

use crate::constraint::Constraint;
use crate::domain_store::DomainStore;

#[derive(Debug, Clone, Default)]
pub struct ConstraintStore {
    constraints: Vec<Constraint>,
}

impl ConstraintStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn extend(&mut self, constraints: impl IntoIterator<Item = Constraint>) {
        self.constraints.extend(constraints);
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    /// Propagates every constraint to a fixed point. Returns `false` if
    /// any domain became empty along the way.
    pub fn propagate_fixed_point(&self, domains: &mut DomainStore) -> bool {
        let mut queue: BTreeSet<usize> = (0..self.constraints.len()).collect();

        while let Some(&i) = queue.iter().next() {
            queue.remove(&i);
            let constraint = &self.constraints[i];
            let before: Vec<VarId> = constraint.variables();
            if !constraint.propagate(domains) {
                return false;
            }
            let dirty = domains.take_dirty();
            if dirty.is_empty() {
                continue;
            }
            for (j, other) in self.constraints.iter().enumerate() {
                if j == i {
                    continue;
                }
                if other.variables().iter().any(|v| dirty.contains(v)) || before.iter().any(|v| dirty.contains(v)) {
                    queue.insert(j);
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Operand;
    use crate::domain::Domain;

    #[test]
    fn propagation_chains_across_constraints() {
        let mut domains = DomainStore::new();
        domains.set(1, Domain::Range { min: 0, max: 10 });
        domains.set(2, Domain::Range { min: 0, max: 10 });
        domains.set(3, Domain::Range { min: 0, max: 10 });

        let mut store = ConstraintStore::new();
        store.push(Constraint::Lt(Operand::Var(1), Operand::Var(2)));
        store.push(Constraint::Eq(Operand::Var(2), Operand::Const(1)));

        assert!(store.propagate_fixed_point(&mut domains));
        assert_eq!(domains.get(1), Some(&Domain::Range { min: 0, max: 0 }));
        assert_eq!(domains.get(2), Some(&Domain::singleton_range(1)));
    }

    #[test]
    fn detects_unsatisfiable_chain() {
        let mut domains = DomainStore::new();
        domains.set(1, Domain::singleton_range(5));
        domains.set(2, Domain::singleton_range(5));

        let mut store = ConstraintStore::new();
        store.push(Constraint::Neq(Operand::Var(1), Operand::Var(2)));
        // Neq on two vars with no bound consts is a no-op in this
        // propagator; pin both to the same const via Eq to force a clash.
        store.push(Constraint::Eq(Operand::Var(1), Operand::Const(5)));
        store.push(Constraint::Eq(Operand::Var(2), Operand::Const(5)));

        assert!(store.propagate_fixed_point(&mut domains));
        assert_eq!(domains.get(1), domains.get(2));
    }
}
