//! Observation models for agent memory.
//!
//! An observation is a single timestamped, confidence-scored fact about an
//! entity. Observations are created by an orchestrator, condensed by the
//! compression pipeline, and read-only during retrieval.
//!
//! # Example
//!
//! ```rust
//! use engram_contracts::Observation;
//!
//! let obs = Observation::new("User prefers dark mode")
//!     .with_confidence(4)
//!     .with_category("preference");
//!
//! assert_eq!(obs.confidence, 4);
//! assert!(!obs.is_critical);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Minimum allowed confidence value.
pub const MIN_CONFIDENCE: u8 = 1;

/// Maximum allowed confidence value.
pub const MAX_CONFIDENCE: u8 = 5;

/// Category assigned when the caller does not provide one.
pub const CATEGORY_GENERAL: &str = "general";

/// Default confidence for observations that do not specify one.
pub const DEFAULT_CONFIDENCE: u8 = 3;

/// Clamp a confidence value into the valid `[1, 5]` range.
pub fn clamp_confidence(value: u8) -> u8 {
    value.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

fn default_confidence() -> u8 {
    DEFAULT_CONFIDENCE
}

fn default_category() -> String {
    CATEGORY_GENERAL.to_string()
}

/// Deserialize a confidence value, clamping out-of-range input instead of
/// rejecting it.
fn deserialize_confidence<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = u8::deserialize(deserializer)?;
    Ok(clamp_confidence(raw))
}

/// A single timestamped fact about an entity.
///
/// Well-known categories are `identity`, `behavior`, `preference`, `goal`,
/// `relationship` and `general`, but the field is free-form so callers can
/// introduce their own taxonomies.
///
/// Invariants:
/// - `confidence` is always within `[1, 5]`; construction and
///   deserialization both clamp.
/// - `source_observations`, when present, lists the original contents a
///   compressed observation replaced, most recent first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    /// The fact itself, as free text.
    pub content: String,

    /// When the fact was observed.
    pub timestamp: DateTime<Utc>,

    /// Confidence in the fact, 1 (weak) to 5 (strong).
    #[serde(
        default = "default_confidence",
        deserialize_with = "deserialize_confidence"
    )]
    pub confidence: u8,

    /// Category of the fact ("general" when unspecified).
    #[serde(default = "default_category")]
    pub category: String,

    /// Critical observations are exempt from compression and expiry.
    #[serde(default)]
    pub is_critical: bool,

    /// Original contents replaced by a compressed observation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_observations: Option<Vec<String>>,
}

impl Observation {
    /// Create a new observation with the current time, default confidence
    /// and the general category.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            timestamp: Utc::now(),
            confidence: DEFAULT_CONFIDENCE,
            category: default_category(),
            is_critical: false,
            source_observations: None,
        }
    }

    /// Set the confidence, clamped to `[1, 5]`.
    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = clamp_confidence(confidence);
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Mark the observation as critical.
    pub fn critical(mut self) -> Self {
        self.is_critical = true;
        self
    }
}

/// A compression input: an observation together with its owning entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingObservation {
    /// Name of the entity the observation belongs to.
    pub entity_name: String,
    /// Type of the owning entity.
    pub entity_type: String,
    /// The observation itself.
    pub observation: Observation,
}

impl PendingObservation {
    pub fn new(
        entity_name: impl Into<String>,
        entity_type: impl Into<String>,
        observation: Observation,
    ) -> Self {
        Self {
            entity_name: entity_name.into(),
            entity_type: entity_type.into(),
            observation,
        }
    }
}

/// The output of compressing a cluster of similar observations.
///
/// Carries full provenance: `source_observations` lists every replaced
/// content, most recent first, and `is_critical` is true iff any source
/// was critical. Temporal compression additionally tags each output with
/// the time window it was computed over.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompressedObservation {
    /// Name of the entity the compressed observation belongs to.
    pub entity_name: String,
    /// Type of the owning entity.
    pub entity_type: String,
    /// Category shared by the source observations.
    pub category: String,
    /// Summarized content.
    pub content: String,
    /// Timestamp of the most recent source observation.
    pub timestamp: DateTime<Utc>,
    /// Rounded mean confidence of the sources.
    pub confidence: u8,
    /// True iff any source observation was critical.
    pub is_critical: bool,
    /// Contents of every source observation, most recent first.
    pub source_observations: Vec<String>,
    /// ISO date of the time window start, set by temporal compression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<String>,
}

impl CompressedObservation {
    /// Convert into a plain observation, e.g. for writing back to the
    /// graph collaborator.
    pub fn into_observation(self) -> Observation {
        Observation {
            content: self.content,
            timestamp: self.timestamp,
            confidence: self.confidence,
            category: self.category,
            is_critical: self.is_critical,
            source_observations: Some(self.source_observations),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_clamped_on_construction() {
        let low = Observation::new("x").with_confidence(0);
        let high = Observation::new("x").with_confidence(9);
        assert_eq!(low.confidence, MIN_CONFIDENCE);
        assert_eq!(high.confidence, MAX_CONFIDENCE);
    }

    #[test]
    fn test_confidence_clamped_on_deserialization() {
        let json = r#"{
            "content": "likes rust",
            "timestamp": "2026-01-15T12:00:00Z",
            "confidence": 42
        }"#;
        let obs: Observation = serde_json::from_str(json).unwrap();
        assert_eq!(obs.confidence, MAX_CONFIDENCE);
        assert_eq!(obs.category, CATEGORY_GENERAL);
        assert!(!obs.is_critical);
    }

    #[test]
    fn test_defaults() {
        let obs = Observation::new("plain fact");
        assert_eq!(obs.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(obs.category, CATEGORY_GENERAL);
        assert!(obs.source_observations.is_none());
    }

    #[test]
    fn test_compressed_into_observation_keeps_provenance() {
        let compressed = CompressedObservation {
            entity_name: "alice".into(),
            entity_type: "person".into(),
            category: "preference".into(),
            content: "alice likes rust (observed 2 times)".into(),
            timestamp: Utc::now(),
            confidence: 4,
            is_critical: true,
            source_observations: vec!["alice likes rust".into(), "alice enjoys rust".into()],
            time_window: None,
        };
        let obs = compressed.into_observation();
        assert!(obs.is_critical);
        assert_eq!(obs.source_observations.unwrap().len(), 2);
    }
}
