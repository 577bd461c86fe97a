//! Finite domains attached to constraint variables.

use std::collections::BTreeSet;

use reasoning_ast::AstId;

/// The domain of a constraint variable: either a bounded integer range
/// or an explicit, finite set of AST values (e.g. symbolic time slots).
///
/// A range supports the arithmetic comparator propagators; an explicit
/// set supports equality and `AllDifferent` only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Domain {
    Range { min: i64, max: i64 },
    Values(BTreeSet<AstId>),
}

/// A single concrete value drawn from either domain shape, used by
/// constraints (like `AllDifferent`) that only need "is this var pinned,
/// and to what" without caring whether the domain is numeric or symbolic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainValue {
    Int(i64),
    Ast(AstId),
}

impl Domain {
    /// The default domain assigned to any variable with no explicit
    /// declaration: a generous finite integer range.
    pub fn default_range() -> Self {
        Domain::Range { min: -100, max: 100 }
    }

    pub fn singleton_range(v: i64) -> Self {
        Domain::Range { min: v, max: v }
    }

    pub fn is_singleton(&self) -> bool {
        match self {
            Domain::Range { min, max } => min == max,
            Domain::Values(set) => set.len() == 1,
        }
    }

    pub fn size(&self) -> i64 {
        match self {
            Domain::Range { min, max } => (max - min + 1).max(0),
            Domain::Values(set) => set.len() as i64,
        }
    }

    /// Returns `true` if the domain has become empty (unsatisfiable).
    pub fn is_empty(&self) -> bool {
        match self {
            Domain::Range { min, max } => min > max,
            Domain::Values(set) => set.is_empty(),
        }
    }

    /// Intersects this domain in place with `other`, returning `true` if
    /// it changed. Domains of different shapes (range vs. values) cannot
    /// be intersected and are left unchanged — this only arises if a
    /// goal mixes arithmetic and symbolic constraints on the same
    /// variable, which this module does not support.
    pub fn intersect(&mut self, other: &Domain) -> bool {
        match (self, other) {
            (Domain::Range { min, max }, Domain::Range { min: omin, max: omax }) => {
                let new_min = (*min).max(*omin);
                let new_max = (*max).min(*omax);
                let changed = new_min != *min || new_max != *max;
                *min = new_min;
                *max = new_max;
                changed
            }
            (Domain::Values(set), Domain::Values(oset)) => {
                let before = set.len();
                set.retain(|v| oset.contains(v));
                before != set.len()
            }
            _ => false,
        }
    }

    /// The domain's single remaining value, if it has narrowed to exactly
    /// one, in either shape.
    pub fn singleton_value(&self) -> Option<DomainValue> {
        match self {
            Domain::Range { min, max } if min == max => Some(DomainValue::Int(*min)),
            Domain::Values(set) if set.len() == 1 => set.iter().next().copied().map(DomainValue::Ast),
            _ => None,
        }
    }

    /// Removes one concrete value from the domain, returning `true` if it
    /// changed. A value of the wrong shape for this domain (e.g. an `Ast`
    /// value against a `Range` domain) is ignored.
    pub fn remove_value(&mut self, value: DomainValue) -> bool {
        match (self, value) {
            (Domain::Range { min, max }, DomainValue::Int(c)) => {
                if *min == *max && *min == c {
                    *min = c + 1; // becomes empty: min > max
                    true
                } else if *min == c {
                    *min += 1;
                    true
                } else if *max == c {
                    *max -= 1;
                    true
                } else {
                    false
                }
            }
            (Domain::Values(set), DomainValue::Ast(id)) => set.remove(&id),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_intersection_narrows_bounds() {
        let mut a = Domain::Range { min: -100, max: 100 };
        let b = Domain::Range { min: 0, max: 10 };
        assert!(a.intersect(&b));
        assert_eq!(a, Domain::Range { min: 0, max: 10 });
    }

    #[test]
    fn singleton_range_is_singleton() {
        assert!(Domain::singleton_range(5).is_singleton());
        assert!(!Domain::Range { min: 0, max: 1 }.is_singleton());
    }

    #[test]
    fn empty_range_detected() {
        let a = Domain::Range { min: 5, max: 3 };
        assert!(a.is_empty());
    }

    #[test]
    fn remove_value_shrinks_range_from_either_end() {
        let mut a = Domain::Range { min: 0, max: 5 };
        assert!(a.remove_value(DomainValue::Int(0)));
        assert_eq!(a, Domain::Range { min: 1, max: 5 });
        assert!(a.remove_value(DomainValue::Int(5)));
        assert_eq!(a, Domain::Range { min: 1, max: 4 });
    }

    #[test]
    fn remove_value_from_values_domain() {
        use reasoning_ast::{AstId, AstStore, Type};
        let mut store = AstStore::new();
        let sym = store.intern("8AM");
        let v = store.constant(sym, None, Type::Atomic(sym));
        let sym2 = store.intern("12PM");
        let v2 = store.constant(sym2, None, Type::Atomic(sym2));
        let mut set: BTreeSet<AstId> = BTreeSet::new();
        set.insert(v);
        set.insert(v2);
        let mut d = Domain::Values(set);
        assert!(d.remove_value(DomainValue::Ast(v)));
        assert_eq!(d.singleton_value(), Some(DomainValue::Ast(v2)));
    }
}
