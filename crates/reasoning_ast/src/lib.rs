#![cfg_attr(docsrs, feature(doc_cfg))]

//! # reasoning-ast
//!
//! The immutable term language shared by every prover in the inference
//! engine core, plus the unification engine and the uniform [`ProofObject`]
//! result value.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                        AstStore                           │
//! │   hash-consing arena: AstId -> AstNodeKind, deduplicated   │
//! └───────────────────────────────────────────────────────────┘
//!                              │
//!               ┌──────────────┴──────────────┐
//!               ▼                             ▼
//! ┌───────────────────────┐       ┌─────────────────────────┐
//! │     substitution       │       │      unification         │
//! │  apply(store, sub, id) │       │  unify(store, a, b)      │
//! └───────────────────────┘       └─────────────────────────┘
//!                              │
//!                              ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │                       ProofObject                          │
//! │   immutable result value returned by every prover           │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Hash-consing
//!
//! AST nodes are interned into an [`AstStore`]: constructing the same
//! node shape twice returns the same [`AstId`]. Equality and hashing on
//! an `AstId` are then integer operations, and substitution that leaves
//! a subtree untouched returns the original ID rather than allocating a
//! structurally-identical copy. This technique is the same one used by
//! trait-solving engines that intern typed terms (e.g. chalk's
//! `Interner`); see `DESIGN.md` for the specific grounding.
//!
//! ## No knowledge of provers
//!
//! This crate defines terms, types, unification, and the proof result
//! value. It does not know how to prove anything — that is every other
//! `reasoning-*` crate's job.

pub mod ast;
pub mod interfaces;
pub mod literal;
pub mod proof;
pub mod prover;
pub mod subst;
pub mod types;
pub mod unify;

pub use ast::{AstId, AstNodeKind, AstStore, ConnectiveKind, ModalOpKind, QuantifierKind, VarId};
pub use interfaces::{KnowledgeStore, TypeSystemManager};
pub use literal::Literal;
pub use proof::{ProofObject, ProofStep};
pub use prover::{Prover, ResourceLimits};
pub use subst::{apply, Substitution};
pub use types::Type;
pub use unify::unify;
