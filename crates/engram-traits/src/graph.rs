//! Graph store trait abstraction.
//!
//! The engine only ever reads from the graph through these four
//! operations, and treats each as potentially failing. Implementations
//! are provided by downstream crates; [`crate::InMemoryGraph`] is the
//! bundled reference backend.

use async_trait::async_trait;

use engram_contracts::{Entity, GraphSnapshot, Relation};

use crate::error::Result;

/// Read interface to an entity/relation graph.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Look up a single entity by its unique name.
    async fn get_entity(&self, name: &str) -> Result<Option<Entity>>;

    /// Search entities matching a free-text query.
    async fn search(&self, query: &str) -> Result<Vec<Entity>>;

    /// All relations touching the named entity (either direction).
    async fn get_entity_relations(&self, name: &str) -> Result<Vec<Relation>>;

    /// Export the full graph contents.
    async fn export_graph(&self) -> Result<GraphSnapshot>;
}
