//! Contracts for the knowledge base and type system the core depends on
//! but does not implement.
//!
//! Neither trait is called by any prover in this workspace: the
//! coordinator resolves a goal and its relevant context before dispatch
//! and hands provers plain `AstId`s and slices, never a `KnowledgeStore`
//! handle. These traits exist so an embedding application can provide
//! its own store and type system behind a stable interface, matching
//! how the original system kept inference decoupled from storage and
//! sort-checking.

use crate::ast::AstId;
use crate::types::Type;

/// A source of facts and rules relevant to a goal.
///
/// Implementations decide how statements are indexed and retrieved;
/// this crate only specifies the shape of the query surface.
pub trait KnowledgeStore {
    /// Returns every statement currently known, without regard to a
    /// particular goal. Used sparingly: most provers should prefer
    /// `statements_relevant_to`.
    fn all_statements(&self) -> Vec<AstId>;

    /// Returns statements judged relevant to proving `goal`, in
    /// whatever order the implementation considers most useful first.
    fn statements_relevant_to(&self, goal: AstId) -> Vec<AstId>;
}

/// A source of type and sort information for constants and variables.
///
/// Left minimal deliberately: provers need only ask "what type does
/// this identifier have", not enumerate a whole sort hierarchy.
pub trait TypeSystemManager {
    /// The type of the named constant or variable, if known.
    fn type_of_name(&self, name: &str) -> Option<Type>;

    /// Whether `sub` is a subtype of (or equal to) `sup`.
    fn is_subtype(&self, sub: &Type, sup: &Type) -> bool;
}
