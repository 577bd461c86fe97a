//! Constraints and their finite-domain propagators.

use reasoning_ast::VarId;

use crate::domain::Domain;
use crate::domain_store::DomainStore;

/// One side of a binary arithmetic constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Var(VarId),
    Const(i64),
}

/// A registered finite-domain constraint: the arithmetic comparators
/// plus the two combinatorial constraints, `AllDifferent` and `SumEquals`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    Eq(Operand, Operand),
    Neq(Operand, Operand),
    Lt(Operand, Operand),
    Le(Operand, Operand),
    Gt(Operand, Operand),
    Ge(Operand, Operand),
    AllDifferent(Vec<VarId>),
    SumEquals(Vec<VarId>, i64),
}

impl Constraint {
    /// Every variable this constraint mentions, for wake-up bookkeeping.
    pub fn variables(&self) -> Vec<VarId> {
        match self {
            Constraint::Eq(a, b)
            | Constraint::Neq(a, b)
            | Constraint::Lt(a, b)
            | Constraint::Le(a, b)
            | Constraint::Gt(a, b)
            | Constraint::Ge(a, b) => [a, b]
                .iter()
                .filter_map(|o| match o {
                    Operand::Var(v) => Some(*v),
                    Operand::Const(_) => None,
                })
                .collect(),
            Constraint::AllDifferent(vars) => vars.clone(),
            Constraint::SumEquals(vars, _) => vars.clone(),
        }
    }

    /// Tightens domains to reflect this constraint. Returns `false` if
    /// the constraint is now unsatisfiable.
    pub fn propagate(&self, domains: &mut DomainStore) -> bool {
        match self {
            Constraint::Eq(a, b) => propagate_eq(*a, *b, domains),
            Constraint::Neq(a, b) => propagate_neq(*a, *b, domains),
            Constraint::Lt(a, b) => propagate_lt(*a, *b, domains, false),
            Constraint::Le(a, b) => propagate_lt(*a, *b, domains, true),
            Constraint::Gt(a, b) => propagate_lt(*b, *a, domains, false),
            Constraint::Ge(a, b) => propagate_lt(*b, *a, domains, true),
            Constraint::AllDifferent(vars) => propagate_all_different(vars, domains),
            Constraint::SumEquals(vars, target) => propagate_sum_equals(vars, *target, domains),
        }
    }
}

fn operand_range(op: Operand, domains: &DomainStore) -> Option<(i64, i64)> {
    match op {
        Operand::Const(c) => Some((c, c)),
        Operand::Var(v) => match domains.get(v) {
            Some(Domain::Range { min, max }) => Some((*min, *max)),
            Some(Domain::Values(_)) | None => None,
        },
    }
}

fn propagate_eq(a: Operand, b: Operand, domains: &mut DomainStore) -> bool {
    match (a, b) {
        (Operand::Var(va), Operand::Var(vb)) => {
            let Some((amin, amax)) = operand_range(a, domains) else { return true };
            let Some((bmin, bmax)) = operand_range(b, domains) else { return true };
            let lo = amin.max(bmin);
            let hi = amax.min(bmax);
            if lo > hi {
                return false;
            }
            let ok_a = domains.intersect(va, &Domain::Range { min: lo, max: hi });
            let ok_b = domains.intersect(vb, &Domain::Range { min: lo, max: hi });
            ok_a && ok_b
        }
        (Operand::Var(v), Operand::Const(c)) | (Operand::Const(c), Operand::Var(v)) => {
            domains.intersect(v, &Domain::singleton_range(c))
        }
        (Operand::Const(c1), Operand::Const(c2)) => c1 == c2,
    }
}

fn propagate_neq(a: Operand, b: Operand, domains: &mut DomainStore) -> bool {
    match (a, b) {
        (Operand::Var(v), Operand::Const(c)) | (Operand::Const(c), Operand::Var(v)) => {
            match domains.get(v) {
                Some(Domain::Range { min, max }) => {
                    if min == max && *min == c {
                        false
                    } else if *min == c {
                        domains.intersect(v, &Domain::Range { min: min + 1, max: *max })
                    } else if *max == c {
                        domains.intersect(v, &Domain::Range { min: *min, max: max - 1 })
                    } else {
                        true
                    }
                }
                _ => true,
            }
        }
        (Operand::Const(c1), Operand::Const(c2)) => c1 != c2,
        _ => true,
    }
}

/// Shared body for `<` (`inclusive = false`) and `<=` (`inclusive = true`).
fn propagate_lt(a: Operand, b: Operand, domains: &mut DomainStore, inclusive: bool) -> bool {
    let Some((amin, amax)) = operand_range(a, domains) else { return true };
    let Some((bmin, bmax)) = operand_range(b, domains) else { return true };
    let offset = if inclusive { 0 } else { 1 };

    let new_amax = amax.min(bmax - offset);
    let new_bmin = bmin.max(amin + offset);

    let mut ok = true;
    if let Operand::Var(va) = a {
        ok &= domains.intersect(va, &Domain::Range { min: amin, max: new_amax });
    } else if amax > new_amax {
        ok = false;
    }
    if let Operand::Var(vb) = b {
        ok &= domains.intersect(vb, &Domain::Range { min: new_bmin, max: bmax });
    } else if bmin < new_bmin {
        ok = false;
    }
    ok
}

/// Generalizes over `Range` and `Values` domains alike: any variable
/// pinned to a single value has that value struck from every other
/// variable's domain, regardless of which domain shape either side uses.
fn propagate_all_different(vars: &[VarId], domains: &mut DomainStore) -> bool {
    let singles: Vec<(VarId, crate::domain::DomainValue)> = vars
        .iter()
        .filter_map(|&v| domains.get(v).and_then(|d| d.singleton_value()).map(|val| (v, val)))
        .collect();

    for &v in vars {
        if domains.get(v).and_then(|d| d.singleton_value()).is_some() {
            continue;
        }
        for &(source, value) in &singles {
            if source == v {
                continue;
            }
            if !domains.remove_value(v, value) {
                return false;
            }
        }
    }
    true
}

fn propagate_sum_equals(vars: &[VarId], target: i64, domains: &mut DomainStore) -> bool {
    let mut min_sum = 0i64;
    let mut max_sum = 0i64;
    for &v in vars {
        match domains.get(v) {
            Some(Domain::Range { min, max }) => {
                min_sum += min;
                max_sum += max;
            }
            _ => return true,
        }
    }
    target >= min_sum && target <= max_sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn eq_var_const_pins_singleton() {
        let mut domains = DomainStore::new();
        domains.set(1, Domain::default_range());
        assert!(propagate_eq(Operand::Var(1), Operand::Const(7), &mut domains));
        assert_eq!(domains.get(1), Some(&Domain::singleton_range(7)));
    }

    #[test]
    fn neq_removes_singleton_clash() {
        let mut domains = DomainStore::new();
        domains.set(1, Domain::singleton_range(3));
        assert!(!propagate_neq(Operand::Var(1), Operand::Const(3), &mut domains));
    }

    #[test]
    fn lt_tightens_both_sides() {
        let mut domains = DomainStore::new();
        domains.set(1, Domain::Range { min: 0, max: 10 });
        domains.set(2, Domain::Range { min: 0, max: 10 });
        assert!(propagate_lt(Operand::Var(1), Operand::Var(2), &mut domains, false));
        assert_eq!(domains.get(1), Some(&Domain::Range { min: 0, max: 9 }));
        assert_eq!(domains.get(2), Some(&Domain::Range { min: 1, max: 10 }));
    }

    #[test]
    fn all_different_removes_bound_singleton_from_others() {
        let mut domains = DomainStore::new();
        domains.set(1, Domain::singleton_range(5));
        domains.set(2, Domain::Range { min: 5, max: 6 });
        let c = Constraint::AllDifferent(vec![1, 2]);
        assert!(c.propagate(&mut domains));
        assert_eq!(domains.get(2), Some(&Domain::singleton_range(6)));
    }

    #[test]
    fn all_different_removes_bound_singleton_from_symbolic_domain() {
        use reasoning_ast::{AstStore, Type};
        let mut store = AstStore::new();
        let morning = store.intern("8AM");
        let morning_id = store.constant(morning, None, Type::Atomic(morning));
        let noon = store.intern("12PM");
        let noon_id = store.constant(noon, None, Type::Atomic(noon));

        let mut domains = DomainStore::new();
        domains.set(1, Domain::Values(BTreeSet::from([morning_id])));
        domains.set(2, Domain::Values(BTreeSet::from([morning_id, noon_id])));

        let c = Constraint::AllDifferent(vec![1, 2]);
        assert!(c.propagate(&mut domains));
        assert_eq!(domains.get(2), Some(&Domain::Values(BTreeSet::from([noon_id]))));
    }

    #[test]
    fn sum_equals_rejects_out_of_range_target() {
        let mut domains = DomainStore::new();
        domains.set(1, Domain::Range { min: 0, max: 2 });
        domains.set(2, Domain::Range { min: 0, max: 2 });
        let c = Constraint::SumEquals(vec![1, 2], 100);
        assert!(!c.propagate(&mut domains));
    }
}
