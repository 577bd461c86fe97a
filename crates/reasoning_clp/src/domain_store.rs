//! The map from constraint variable to current domain, plus the
//! dirty-set of recently-changed variables that drives wake-up.

use std::collections::{BTreeMap, BTreeSet};

use reasoning_ast::VarId;

use crate::domain::{Domain, DomainValue};

#[derive(Debug, Clone, Default)]
pub struct DomainStore {
    domains: BTreeMap<VarId, Domain>,
    dirty: BTreeSet<VarId>,
}

impl DomainStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, var: VarId, domain: Domain) {
        self.domains.insert(var, domain);
        self.dirty.insert(var);
    }

    pub fn get(&self, var: VarId) -> Option<&Domain> {
        self.domains.get(&var)
    }

    /// Ensures `var` has a domain, inserting the default range if absent.
    pub fn ensure(&mut self, var: VarId) {
        self.domains.entry(var).or_insert_with(Domain::default_range);
    }

    /// Intersects `var`'s domain with `other`, marking it dirty if it
    /// changed. Returns `false` if the resulting domain is empty
    /// (unsatisfiable).
    pub fn intersect(&mut self, var: VarId, other: &Domain) -> bool {
        self.ensure(var);
        let domain = self.domains.get_mut(&var).unwrap();
        if domain.intersect(other) {
            self.dirty.insert(var);
        }
        !domain.is_empty()
    }

    /// Removes one concrete value from `var`'s domain, marking it dirty if
    /// it changed. Returns `false` if the domain is now empty.
    pub fn remove_value(&mut self, var: VarId, value: DomainValue) -> bool {
        self.ensure(var);
        let domain = self.domains.get_mut(&var).unwrap();
        if domain.remove_value(value) {
            self.dirty.insert(var);
        }
        !domain.is_empty()
    }

    pub fn variables(&self) -> impl Iterator<Item = VarId> + '_ {
        self.domains.keys().copied()
    }

    pub fn take_dirty(&mut self) -> BTreeSet<VarId> {
        std::mem::take(&mut self.dirty)
    }

    pub fn all_singleton(&self) -> bool {
        self.domains.values().all(|d| d.is_singleton())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_inserts_default_range_once() {
        let mut store = DomainStore::new();
        store.ensure(1);
        store.ensure(1);
        assert_eq!(store.get(1), Some(&Domain::default_range()));
    }

    #[test]
    fn intersect_narrows_and_marks_dirty() {
        let mut store = DomainStore::new();
        store.set(1, Domain::default_range());
        store.take_dirty();
        assert!(store.intersect(1, &Domain::Range { min: 0, max: 5 }));
        assert!(store.take_dirty().contains(&1));
    }

    #[test]
    fn intersect_detects_unsatisfiability() {
        let mut store = DomainStore::new();
        store.set(1, Domain::Range { min: 0, max: 5 });
        let ok = store.intersect(1, &Domain::Range { min: 10, max: 20 });
        assert!(!ok);
    }
}
