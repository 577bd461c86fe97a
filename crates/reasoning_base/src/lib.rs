//! Structural primitives shared by every inference-engine crate.
//!
//! This crate has no knowledge of logical terms, provers, or proof search.
//! It provides only generic, reusable infrastructure that higher-level
//! crates build upon:
//!
//! - [`Interner`]/[`Symbol`] — string interning for O(1) name equality
//! - [`IdGen`] — an explicit, caller-owned counter for fresh IDs
//!
//! # Design Principles
//!
//! Uniqueness of variable, clause, Skolem-function, and world IDs is
//! required process-wide, but a `static` global counter makes proof
//! search non-reproducible across test runs and impossible to reset
//! between independent proof attempts. [`IdGen`] is threaded explicitly
//! instead: each proof attempt owns one, so two attempts never compete
//! for the same counter and a single attempt's numbering is stable.

pub mod id;
pub mod intern;

pub use id::IdGen;
pub use intern::{Interner, Symbol, SymbolEq};
