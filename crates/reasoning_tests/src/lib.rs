//! A minimal in-memory [`KnowledgeStore`] used only by this crate's own
//! integration tests.
//!
//! No production crate depends on `reasoning-tests` — it exists purely
//! as a `dev-dependency` sink, the same role `logicaffeine-tests` plays
//! in the teacher workspace: a place for cross-crate end-to-end tests
//! and shared fixtures to live without pulling test-only code into any
//! shipped crate.

use std::collections::BTreeMap;

use reasoning_ast::{AstId, KnowledgeStore};

/// Every statement ever added, grouped by an opaque context id.
///
/// Retrieval is unranked: `statements_relevant_to` just returns
/// everything, since this store has no indexing of its own — it is a
/// fixture for exercising [`reasoning_coordinator::Coordinator`] against
/// the `KnowledgeStore` contract, not a real implementation of it.
#[derive(Debug, Default)]
pub struct InMemoryKnowledgeStore {
    contexts: BTreeMap<String, Vec<AstId>>,
}

impl InMemoryKnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_context(&mut self, id: impl Into<String>) {
        self.contexts.entry(id.into()).or_default();
    }

    pub fn add_statement(&mut self, ast: AstId, context_id: &str) {
        self.contexts.entry(context_id.to_string()).or_default().push(ast);
    }

    pub fn query_all_statements(&self, context_ids: &[&str]) -> Vec<AstId> {
        context_ids
            .iter()
            .flat_map(|id| self.contexts.get(*id).into_iter().flatten().copied())
            .collect()
    }
}

impl KnowledgeStore for InMemoryKnowledgeStore {
    fn all_statements(&self) -> Vec<AstId> {
        self.contexts.values().flatten().copied().collect()
    }

    fn statements_relevant_to(&self, _goal: AstId) -> Vec<AstId> {
        self.all_statements()
    }
}
