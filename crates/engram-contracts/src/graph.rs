//! Entity and relation models as exposed by the graph collaborator.
//!
//! The engine only reads these shapes; uniqueness of entity names and the
//! latest-write-wins rule for relation triples are enforced by the graph
//! store, not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::observation::Observation;

/// A named subject (person, place, concept) owning observations.
///
/// `name` is the entity's identity key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    /// Unique name identifying the entity.
    pub name: String,
    /// Free-form type label ("person", "project", ...).
    pub entity_type: String,
    /// Observations recorded about the entity, in insertion order.
    #[serde(default)]
    pub observations: Vec<Observation>,
}

impl Entity {
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            observations: Vec::new(),
        }
    }

    /// Append observations, builder-style.
    pub fn with_observations(mut self, observations: Vec<Observation>) -> Self {
        self.observations = observations;
        self
    }

    /// Timestamp of the most recent observation, if any.
    pub fn most_recent_observation(&self) -> Option<DateTime<Utc>> {
        self.observations.iter().map(|o| o.timestamp).max()
    }
}

/// Attributes attached to a relation.
///
/// `time` and `is_critical` are understood by the engine; everything else
/// is passed through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RelationAttributes {
    /// When the relation was established or last observed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,

    /// Critical relations are surfaced by critical-only retrieval and
    /// receive a scoring bonus.
    #[serde(default)]
    pub is_critical: bool,

    /// Any further attributes the orchestrator attached.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A directed, typed edge between two entities.
///
/// Identity is the (from, relation_type, to) triple; duplicate triples are
/// the same relation and the latest write wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Relation {
    /// Source entity name.
    pub from: String,
    /// Edge type ("works_at", "knows", ...).
    pub relation_type: String,
    /// Target entity name.
    pub to: String,
    /// Attached attributes.
    #[serde(default)]
    pub attributes: RelationAttributes,
}

impl Relation {
    pub fn new(
        from: impl Into<String>,
        relation_type: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            relation_type: relation_type.into(),
            to: to.into(),
            attributes: RelationAttributes::default(),
        }
    }

    /// Set the relation time, builder-style.
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.attributes.time = Some(time);
        self
    }

    /// Mark the relation as critical.
    pub fn critical(mut self) -> Self {
        self.attributes.is_critical = true;
        self
    }

    /// The identity triple of this relation.
    pub fn identity(&self) -> (&str, &str, &str) {
        (&self.from, &self.relation_type, &self.to)
    }
}

/// Full graph contents as returned by `export_graph`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_most_recent_observation() {
        let t1 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let entity = Entity::new("alice", "person").with_observations(vec![
            Observation::new("older").with_timestamp(t1),
            Observation::new("newer").with_timestamp(t2),
        ]);
        assert_eq!(entity.most_recent_observation(), Some(t2));

        let empty = Entity::new("bob", "person");
        assert_eq!(empty.most_recent_observation(), None);
    }

    #[test]
    fn test_relation_identity_triple() {
        let rel = Relation::new("alice", "knows", "bob");
        assert_eq!(rel.identity(), ("alice", "knows", "bob"));
    }

    #[test]
    fn test_relation_attributes_roundtrip_extra() {
        let json = r#"{
            "from": "alice",
            "relation_type": "works_at",
            "to": "acme",
            "attributes": {"is_critical": true, "role": "engineer"}
        }"#;
        let rel: Relation = serde_json::from_str(json).unwrap();
        assert!(rel.attributes.is_critical);
        assert_eq!(rel.attributes.extra["role"], "engineer");
        assert!(rel.attributes.time.is_none());
    }
}
