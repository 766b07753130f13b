//! In-memory graph store.
//!
//! A deterministic reference backend: entities are kept in name order and
//! relations in insertion order with latest-write-wins
//! upserts on the (from, relation_type, to) identity triple. Useful as a
//! test fake and for orchestrators that do not need durability.
//!
//! # Example
//!
//! ```ignore
//! use engram_traits::{GraphStore, InMemoryGraph};
//! use engram_contracts::Entity;
//!
//! let graph = InMemoryGraph::new();
//! graph.create_entity(Entity::new("alice", "person")).await;
//! let found = graph.get_entity("alice").await?;
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use engram_contracts::{Entity, GraphSnapshot, Observation, Relation};

use crate::error::Result;
use crate::graph::GraphStore;

#[derive(Default)]
struct GraphInner {
    /// Entities keyed by name; BTreeMap keeps export order deterministic.
    entities: BTreeMap<String, Entity>,
    /// Relations in insertion order.
    relations: Vec<Relation>,
}

/// In-memory implementation of [`GraphStore`].
#[derive(Default)]
pub struct InMemoryGraph {
    inner: RwLock<GraphInner>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, replacing any existing entity of the same name.
    pub async fn create_entity(&self, entity: Entity) {
        let mut inner = self.inner.write().await;
        inner.entities.insert(entity.name.clone(), entity);
    }

    /// Append observations to an existing entity. Returns false when the
    /// entity does not exist.
    pub async fn add_observations(&self, name: &str, observations: Vec<Observation>) -> bool {
        let mut inner = self.inner.write().await;
        match inner.entities.get_mut(name) {
            Some(entity) => {
                entity.observations.extend(observations);
                true
            }
            None => false,
        }
    }

    /// Insert or replace a relation. Duplicate (from, relation_type, to)
    /// triples are the same relation; the latest write wins.
    pub async fn upsert_relation(&self, relation: Relation) {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.relations.iter_mut().find(|r| {
            r.from == relation.from && r.relation_type == relation.relation_type && r.to == relation.to
        }) {
            *existing = relation;
        } else {
            inner.relations.push(relation);
        }
    }

    /// Number of stored entities.
    pub async fn entity_count(&self) -> usize {
        self.inner.read().await.entities.len()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraph {
    async fn get_entity(&self, name: &str) -> Result<Option<Entity>> {
        let inner = self.inner.read().await;
        Ok(inner.entities.get(name).cloned())
    }

    async fn search(&self, query: &str) -> Result<Vec<Entity>> {
        let needle = query.to_lowercase();
        let inner = self.inner.read().await;
        let matches = inner
            .entities
            .values()
            .filter(|entity| {
                entity.name.to_lowercase().contains(&needle)
                    || entity.entity_type.to_lowercase().contains(&needle)
                    || entity
                        .observations
                        .iter()
                        .any(|o| o.content.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        Ok(matches)
    }

    async fn get_entity_relations(&self, name: &str) -> Result<Vec<Relation>> {
        let inner = self.inner.read().await;
        let matches = inner
            .relations
            .iter()
            .filter(|r| r.from == name || r.to == name)
            .cloned()
            .collect();
        Ok(matches)
    }

    async fn export_graph(&self) -> Result<GraphSnapshot> {
        let inner = self.inner.read().await;
        Ok(GraphSnapshot {
            entities: inner.entities.values().cloned().collect(),
            relations: inner.relations.clone(),
        })
    }
}
