//! Compression pipeline: filter -> cluster -> summarize.
//!
//! ```text
//! PendingObservation[]
//!        |
//!   group_eligible        (age / confidence / critical rules)
//!        |
//!   cluster_by_similarity (greedy seed-based, per group)
//!        |
//!   Summarizer            (one compressed observation per cluster)
//!        |
//! CompressedObservation[] (with provenance)
//! ```
//!
//! The engine is stateless: every call computes from the data passed in.
//! Internal faults are logged and skipped; the batch never fails.

mod cluster;
mod filter;
mod similarity;
mod summarize;
mod temporal;

pub use cluster::cluster_by_similarity;
pub use filter::{group_eligible, ObservationGroup};
pub use similarity::token_set_similarity;
pub use summarize::{HeuristicSummarizer, Summarizer};
pub use temporal::{bucket_by_window, window_key, DEFAULT_WINDOW_DAYS};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use engram_contracts::{CompressedObservation, PendingObservation};

use crate::config::CompressionConfig;
use crate::error::Result;

/// Size metrics reported alongside a compression run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct CompressionStats {
    /// Observations offered to the pipeline.
    pub pending: usize,
    /// Observations that survived eligibility filtering.
    pub eligible: usize,
    /// Groups that met the compression threshold.
    pub groups: usize,
    /// Clusters of similar observations found.
    pub clusters: usize,
    /// Compressed observations emitted.
    pub compressed: usize,
}

/// The compression engine.
///
/// Construction validates the configuration; that is the only hard
/// failure. The summarization strategy is pluggable via
/// [`with_summarizer`](CompressionEngine::with_summarizer).
pub struct CompressionEngine {
    config: CompressionConfig,
    summarizer: Box<dyn Summarizer>,
}

impl CompressionEngine {
    /// Create an engine with the given configuration and the default
    /// heuristic summarizer. Fails fast on invalid configuration.
    pub fn new(config: CompressionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            summarizer: Box::new(HeuristicSummarizer::new()),
        })
    }

    /// Create an engine with default configuration.
    pub fn with_default_config() -> Self {
        Self {
            config: CompressionConfig::default(),
            summarizer: Box::new(HeuristicSummarizer::new()),
        }
    }

    /// Replace the summarization strategy.
    pub fn with_summarizer(mut self, summarizer: Box<dyn Summarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Compress eligible pending observations.
    ///
    /// Originals are never deleted here; the orchestrator decides what to
    /// do with the sources each compressed observation lists.
    pub fn compress(&self, pending: &[PendingObservation]) -> Vec<CompressedObservation> {
        self.compress_with_stats(pending).0
    }

    /// Compress and report size metrics for the run.
    pub fn compress_with_stats(
        &self,
        pending: &[PendingObservation],
    ) -> (Vec<CompressedObservation>, CompressionStats) {
        let (output, stats) = self.compress_at(pending, Utc::now());
        info!(
            pending = stats.pending,
            eligible = stats.eligible,
            groups = stats.groups,
            clusters = stats.clusters,
            compressed = stats.compressed,
            "compression pass complete"
        );
        (output, stats)
    }

    /// Compress observations bucketed into fixed-size time windows.
    ///
    /// Each window runs the full pipeline independently and its outputs
    /// are tagged with the window key, concatenated chronologically.
    pub fn compress_windowed(
        &self,
        pending: &[PendingObservation],
        window_days: i64,
    ) -> Vec<CompressedObservation> {
        let window_days = if window_days > 0 {
            window_days
        } else {
            debug!(window_days, "non-positive window, using default");
            DEFAULT_WINDOW_DAYS
        };

        let mut output = Vec::new();
        for (key, bucket) in bucket_by_window(pending, window_days) {
            let (mut compressed, _) = self.compress_at(&bucket, Utc::now());
            for item in &mut compressed {
                item.time_window = Some(key.clone());
            }
            output.extend(compressed);
        }
        output
    }

    /// Pipeline body with an explicit clock, for deterministic tests.
    fn compress_at(
        &self,
        pending: &[PendingObservation],
        now: DateTime<Utc>,
    ) -> (Vec<CompressedObservation>, CompressionStats) {
        let mut stats = CompressionStats {
            pending: pending.len(),
            ..Default::default()
        };

        let groups = group_eligible(pending, &self.config, now);
        stats.groups = groups.len();
        stats.eligible = groups.iter().map(|g| g.observations.len()).sum();

        let mut output = Vec::new();
        for group in &groups {
            let clusters =
                cluster_by_similarity(&group.observations, self.config.similarity_threshold);
            stats.clusters += clusters.len();

            for cluster in &clusters {
                match self.summarizer.summarize(
                    cluster,
                    &group.entity_name,
                    &group.entity_type,
                    &group.category,
                ) {
                    Some(compressed) => output.push(compressed),
                    None => {
                        debug!(group = %group.key(), "summarizer skipped a cluster");
                    }
                }
            }
        }

        stats.compressed = output.len();
        (output, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use engram_contracts::Observation;

    fn engine(similarity: f64, threshold: usize) -> CompressionEngine {
        CompressionEngine::new(
            CompressionConfig::default()
                .with_similarity_threshold(similarity)
                .with_compression_threshold(threshold),
        )
        .unwrap()
    }

    fn pending(content: &str, age_days: i64) -> PendingObservation {
        PendingObservation::new(
            "alice",
            "person",
            Observation::new(content)
                .with_confidence(5)
                .with_category("goal")
                .with_timestamp(Utc::now() - Duration::days(age_days)),
        )
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = CompressionConfig::default().with_similarity_threshold(2.0);
        assert!(CompressionEngine::new(config).is_err());
    }

    #[test]
    fn test_two_similar_observations_merge() {
        // Shared tokens ("user", "about") at threshold 0.2 must cluster
        // and produce exactly one compressed observation.
        let items = vec![
            pending("User asked about memory", 1),
            pending("User questioned about storage", 0),
        ];
        let engine = engine(0.2, 2);
        let compressed = engine.compress(&items);

        assert_eq!(compressed.len(), 1);
        assert_eq!(compressed[0].source_observations.len(), 2);
        assert_eq!(compressed[0].entity_name, "alice");
        assert_eq!(compressed[0].category, "goal");
    }

    #[test]
    fn test_below_threshold_group_emits_nothing() {
        let items = vec![
            pending("user likes rust", 1),
            pending("user likes rust", 0),
        ];
        assert!(engine(0.2, 5).compress(&items).is_empty());
    }

    #[test]
    fn test_dissimilar_observations_emit_nothing() {
        let items = vec![
            pending("alpha beta gamma", 0),
            pending("delta epsilon zeta", 0),
        ];
        assert!(engine(0.6, 2).compress(&items).is_empty());
    }

    #[test]
    fn test_stats_reported() {
        let items = vec![
            pending("user likes rust a lot", 0),
            pending("user likes rust quite a lot", 1),
            pending("unrelated thing entirely different", 0),
        ];
        let (compressed, stats) = engine(0.5, 3).compress_with_stats(&items);

        assert_eq!(stats.pending, 3);
        assert_eq!(stats.eligible, 3);
        assert_eq!(stats.groups, 1);
        assert_eq!(stats.clusters, 1);
        assert_eq!(stats.compressed, compressed.len());
        assert_eq!(compressed.len(), 1);
    }

    #[test]
    fn test_windowed_compression_tags_buckets() {
        // Two windows, each with its own pair of similar observations.
        // A generous max age keeps old buckets eligible.
        let engine = CompressionEngine::new(
            CompressionConfig::default()
                .with_similarity_threshold(0.2)
                .with_compression_threshold(2)
                .with_max_observation_age_days(365),
        )
        .unwrap();

        let t_old = Utc::now() - Duration::days(100);
        let t_new = Utc::now() - Duration::days(10);
        let make = |content: &str, ts| {
            PendingObservation::new(
                "alice",
                "person",
                Observation::new(content)
                    .with_confidence(5)
                    .with_timestamp(ts),
            )
        };

        let items = vec![
            make("user asked about memory", t_old),
            make("user asked about recall", t_old),
            make("user asked about memory", t_new),
            make("user asked about recall", t_new),
        ];
        let compressed = engine.compress_windowed(&items, 30);

        assert_eq!(compressed.len(), 2);
        assert_eq!(
            compressed[0].time_window.as_deref(),
            Some(window_key(t_old, 30).as_str())
        );
        assert_eq!(
            compressed[1].time_window.as_deref(),
            Some(window_key(t_new, 30).as_str())
        );
    }

    #[test]
    fn test_windowed_buckets_do_not_cluster_together() {
        // Similar observations split across windows never reach the same
        // cluster, so neither window meets the group threshold alone.
        let engine = CompressionEngine::new(
            CompressionConfig::default()
                .with_similarity_threshold(0.2)
                .with_compression_threshold(2)
                .with_max_observation_age_days(365),
        )
        .unwrap();

        let items = vec![
            PendingObservation::new(
                "alice",
                "person",
                Observation::new("user asked about memory")
                    .with_confidence(5)
                    .with_timestamp(Utc::now() - Duration::days(100)),
            ),
            PendingObservation::new(
                "alice",
                "person",
                Observation::new("user asked about recall")
                    .with_confidence(5)
                    .with_timestamp(Utc::now() - Duration::days(10)),
            ),
        ];
        assert!(engine.compress_windowed(&items, 30).is_empty());
    }
}
