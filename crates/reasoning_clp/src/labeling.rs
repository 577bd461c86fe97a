//! Enumerating concrete values for the remaining non-singleton domains
//! once constraint propagation alone cannot narrow further.

use reasoning_ast::AstId;

use crate::domain::Domain;
use crate::domain_store::DomainStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableSelection {
    /// The first non-singleton variable, in `VarId` order.
    Default,
    /// The non-singleton variable with the smallest remaining domain.
    FirstFail,
}

impl VariableSelection {
    pub fn parse(name: &str) -> Self {
        match name {
            "first_fail" => VariableSelection::FirstFail,
            _ => VariableSelection::Default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOrder {
    Min,
    Max,
    MiddleOut,
}

impl ValueOrder {
    pub fn parse(name: &str) -> Self {
        match name {
            "max" => ValueOrder::Max,
            "middle_out" => ValueOrder::MiddleOut,
            _ => ValueOrder::Min,
        }
    }
}

/// Picks the next variable to label, per `strategy`. Returns `None` once
/// every domain is a singleton.
pub fn select_variable(domains: &DomainStore, strategy: VariableSelection) -> Option<u64> {
    let candidates = domains.variables().filter(|&v| !domains.get(v).unwrap().is_singleton());
    match strategy {
        VariableSelection::Default => candidates.min(),
        VariableSelection::FirstFail => candidates.min_by_key(|&v| domains.get(v).unwrap().size()),
    }
}

/// Enumerates the candidate values for `var`'s domain in the order
/// `order` calls for. Only meaningful for a `Range` domain; `Values`
/// domains are enumerated in their natural (ascending `AstId`) order
/// regardless of `order`, since "min"/"max"/"middle_out" presume a
/// numeric axis.
pub fn candidate_values(domain: &Domain, order: ValueOrder) -> Vec<i64> {
    match domain {
        Domain::Range { min, max } => {
            let ascending: Vec<i64> = (*min..=*max).collect();
            match order {
                ValueOrder::Min => ascending,
                ValueOrder::Max => ascending.into_iter().rev().collect(),
                ValueOrder::MiddleOut => {
                    let mid = (*min + *max) / 2;
                    let mut out = vec![mid];
                    let mut lo = mid - 1;
                    let mut hi = mid + 1;
                    while lo >= *min || hi <= *max {
                        if hi <= *max {
                            out.push(hi);
                            hi += 1;
                        }
                        if lo >= *min {
                            out.push(lo);
                            lo -= 1;
                        }
                    }
                    out
                }
            }
        }
        Domain::Values(_) => vec![],
    }
}

/// Enumerates the candidate AST values for a `Values` domain, in
/// ascending order. `order` is not consulted: "min"/"max"/"middle_out"
/// presume a numeric axis that a symbolic domain does not have, so
/// symbolic labeling always proceeds in the domain's natural order.
pub fn candidate_value_ids(domain: &Domain) -> Vec<AstId> {
    match domain {
        Domain::Values(set) => set.iter().copied().collect(),
        Domain::Range { .. } => vec![],
    }
}
