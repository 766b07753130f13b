//! Scored result types produced by the retrieval pipeline.
//!
//! Scores are transient: computed fresh per invocation and never
//! persisted. Every degraded result carries its failure reason in an
//! `error` field instead of propagating an exception to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::{Entity, Relation};
use crate::observation::Observation;

/// Breakdown of how a score was calculated.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    /// Score contribution from keyword relevance.
    pub relevance: f64,
    /// Score contribution from recency.
    pub recency: f64,
    /// Score contribution from confidence.
    pub confidence: f64,
}

/// An entity with its retrieval score and factor breakdown.
///
/// The embedded entity carries only the observations that survived
/// filtering, ordered by descending observation score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredEntity {
    pub entity: Entity,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// A relation with its retrieval score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredRelation {
    pub relation: Relation,
    pub score: f64,
}

/// An observation with its retrieval score and factor breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredObservation {
    pub observation: Observation,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Ranked result of context-driven retrieval.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RetrievalResult {
    /// Entities ranked by descending score, truncated to the configured
    /// maximum.
    pub entities: Vec<ScoredEntity>,
    /// Relations of the selected entities, ranked and truncated.
    pub relations: Vec<ScoredRelation>,
    /// Failure reason when the result is degraded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RetrievalResult {
    /// An empty result carrying a failure reason.
    pub fn degraded(error: impl Into<String>) -> Self {
        Self {
            entities: Vec::new(),
            relations: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Result of category-scoped retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRetrieval {
    /// The requested category.
    pub category: String,
    /// Entities whose observations matched the category, each carrying
    /// only the matching observations.
    pub entities: Vec<ScoredEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of critical-only retrieval. Matches are returned unranked and
/// untruncated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CriticalRetrieval {
    pub entities: Vec<Entity>,
    pub relations: Vec<Relation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// An inclusive time range with open bounds.
///
/// An unset `start` means the beginning of time; an unset `end` means now.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct TimeRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Whether `timestamp` falls within the range, inclusive on both
    /// bounds. `now` resolves an open end bound.
    pub fn contains(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let start = self.start.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let end = self.end.unwrap_or(now);
        timestamp >= start && timestamp <= end
    }
}

/// Result of time-range retrieval. Matches are returned unranked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeRangeRetrieval {
    pub time_range: TimeRange,
    pub entities: Vec<Entity>,
    pub relations: Vec<Relation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
