//! Engine configuration.
//!
//! Both engines validate their configuration once, at construction.
//! Invalid configuration is the only hard failure in the crate; every
//! runtime fault degrades to an empty result instead.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Weights applied to the scoring factors.
///
/// The weights are applied exactly as given and are not required to sum
/// to 1; normalizing them silently would change ranking order, so totals
/// may leave the nominal `[0, 1]` range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoringWeights {
    pub relevance: f64,
    pub recency: f64,
    pub confidence: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            relevance: 0.4,
            recency: 0.3,
            confidence: 0.3,
        }
    }
}

impl ScoringWeights {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("relevance", self.relevance),
            ("recency", self.recency),
            ("confidence", self.confidence),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "weight {name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for the compression pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompressionConfig {
    /// Minimum eligible observations in a group before compression runs.
    pub compression_threshold: usize,
    /// Minimum token-set similarity for joining a cluster seed.
    pub similarity_threshold: f64,
    /// Observations older than this many days are left alone.
    pub max_observation_age_days: i64,
    /// When true, critical observations are never compression input.
    pub preserve_critical: bool,
    /// Observations below this confidence are left alone.
    pub min_confidence: u8,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            compression_threshold: 5,
            similarity_threshold: 0.6,
            max_observation_age_days: 7,
            preserve_critical: true,
            min_confidence: 3,
        }
    }
}

impl CompressionConfig {
    /// Set the compression threshold.
    pub fn with_compression_threshold(mut self, threshold: usize) -> Self {
        self.compression_threshold = threshold;
        self
    }

    /// Set the similarity threshold.
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Set the maximum observation age in days.
    pub fn with_max_observation_age_days(mut self, days: i64) -> Self {
        self.max_observation_age_days = days;
        self
    }

    /// Enable or disable the critical-preservation exemption.
    pub fn with_preserve_critical(mut self, preserve: bool) -> Self {
        self.preserve_critical = preserve;
        self
    }

    /// Set the minimum confidence for compression eligibility.
    pub fn with_min_confidence(mut self, min_confidence: u8) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Validate the configuration, failing fast on nonsense values.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(EngineError::InvalidConfig(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.compression_threshold < 2 {
            return Err(EngineError::InvalidConfig(format!(
                "compression_threshold must be at least 2, got {}",
                self.compression_threshold
            )));
        }
        if self.max_observation_age_days <= 0 {
            return Err(EngineError::InvalidConfig(format!(
                "max_observation_age_days must be positive, got {}",
                self.max_observation_age_days
            )));
        }
        if !(1..=5).contains(&self.min_confidence) {
            return Err(EngineError::InvalidConfig(format!(
                "min_confidence must be within [1, 5], got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }
}

/// Configuration for the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Maximum entities returned by ranked retrieval.
    pub max_entities: usize,
    /// Maximum observations kept per selected entity.
    pub max_observations_per_entity: usize,
    /// Maximum relations returned by ranked retrieval.
    pub max_relations: usize,
    /// Day span over which recency decays linearly from 1 to 0.
    pub recency_window_days: i64,
    /// Observations below this confidence are dropped from results.
    pub min_confidence: u8,
    /// Factor weights for scoring.
    pub weights: ScoringWeights,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_entities: 10,
            max_observations_per_entity: 5,
            max_relations: 20,
            recency_window_days: 30,
            min_confidence: 3,
            weights: ScoringWeights::default(),
        }
    }
}

impl RetrievalConfig {
    /// Create a config that prioritizes recency over relevance.
    pub fn recency_focused() -> Self {
        Self {
            weights: ScoringWeights {
                relevance: 0.2,
                recency: 0.6,
                confidence: 0.2,
            },
            ..Default::default()
        }
    }

    /// Create a config that prioritizes relevance over recency.
    pub fn relevance_focused() -> Self {
        Self {
            weights: ScoringWeights {
                relevance: 0.7,
                recency: 0.15,
                confidence: 0.15,
            },
            ..Default::default()
        }
    }

    /// Set the maximum entity count.
    pub fn with_max_entities(mut self, max_entities: usize) -> Self {
        self.max_entities = max_entities;
        self
    }

    /// Set the maximum observations kept per entity.
    pub fn with_max_observations_per_entity(mut self, max: usize) -> Self {
        self.max_observations_per_entity = max;
        self
    }

    /// Set the maximum relation count.
    pub fn with_max_relations(mut self, max_relations: usize) -> Self {
        self.max_relations = max_relations;
        self
    }

    /// Set the recency window in days.
    pub fn with_recency_window_days(mut self, days: i64) -> Self {
        self.recency_window_days = days;
        self
    }

    /// Set the minimum confidence for returned observations.
    pub fn with_min_confidence(mut self, min_confidence: u8) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Set the scoring weights.
    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Validate the configuration, failing fast on nonsense values.
    pub fn validate(&self) -> Result<()> {
        if self.max_entities == 0 {
            return Err(EngineError::InvalidConfig(
                "max_entities must be at least 1".to_string(),
            ));
        }
        if self.max_observations_per_entity == 0 {
            return Err(EngineError::InvalidConfig(
                "max_observations_per_entity must be at least 1".to_string(),
            ));
        }
        if self.max_relations == 0 {
            return Err(EngineError::InvalidConfig(
                "max_relations must be at least 1".to_string(),
            ));
        }
        if self.recency_window_days <= 0 {
            return Err(EngineError::InvalidConfig(format!(
                "recency_window_days must be positive, got {}",
                self.recency_window_days
            )));
        }
        if !(1..=5).contains(&self.min_confidence) {
            return Err(EngineError::InvalidConfig(format!(
                "min_confidence must be within [1, 5], got {}",
                self.min_confidence
            )));
        }
        self.weights.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_defaults_are_valid() {
        assert!(CompressionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_retrieval_defaults_are_valid() {
        assert!(RetrievalConfig::default().validate().is_ok());
    }

    #[test]
    fn test_similarity_threshold_out_of_range() {
        let config = CompressionConfig::default().with_similarity_threshold(1.5);
        assert!(config.validate().is_err());
        let config = CompressionConfig::default().with_similarity_threshold(-0.1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_compression_threshold_too_small() {
        let config = CompressionConfig::default().with_compression_threshold(1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_age_rejected() {
        let config = CompressionConfig::default().with_max_observation_age_days(-7);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let config = RetrievalConfig::default().with_weights(ScoringWeights {
            relevance: -0.4,
            recency: 0.3,
            confidence: 0.3,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unnormalized_weights_accepted() {
        // Weights are applied as given; summing past 1.0 is legal.
        let config = RetrievalConfig::default().with_weights(ScoringWeights {
            relevance: 1.0,
            recency: 1.0,
            confidence: 1.0,
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let recency = RetrievalConfig::recency_focused();
        assert!(recency.weights.recency > recency.weights.relevance);

        let relevance = RetrievalConfig::relevance_focused();
        assert!(relevance.weights.relevance > relevance.weights.recency);
    }
}
