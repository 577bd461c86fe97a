//! The small type language attached to every AST node.
//!
//! Types exist so unification and constraint propagation can reject
//! ill-sorted bindings (e.g. unifying a numeric variable with a text
//! constant) without needing a full type-checker.

use reasoning_base::Symbol;

/// A type attached to an AST node.
///
/// `Function` covers predicate and operator signatures: a predicate
/// `Mortal(x)` has type `Function(vec![Atomic(x's sort)], Box::new(Boolean))`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Boolean,
    Integer,
    Real,
    Text,
    /// A user-defined sort, e.g. `Person` or `Block`.
    Atomic(Symbol),
    Function(Vec<Type>, Box<Type>),
}

impl Type {
    /// Returns `true` if the two types can unify, i.e. are structurally equal.
    ///
    /// There is no subtyping or coercion in this type language: `Integer`
    /// and `Real` are distinct sorts, matching how the domain stores in
    /// [`reasoning-clp`](../reasoning_clp) keep integer and real finite
    /// domains separate.
    pub fn compatible(&self, other: &Type) -> bool {
        self == other
    }
}
