//! Multi-factor scoring for entities, relations and observations.
//!
//! Three factors drive ranking:
//!
//! - **relevance**: fraction of context keywords found in the candidate
//! - **recency**: linear decay from 1 to 0 over the recency window
//! - **confidence**: mean observation confidence normalized to `[0, 1]`
//!
//! The factors are combined as a weighted sum with the configured
//! weights, applied exactly as given. Critical items receive flat
//! bonuses on top.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use engram_contracts::{Entity, Observation, Relation, ScoreBreakdown, ScoredObservation};

use crate::config::RetrievalConfig;

/// Flat bonus added to critical relations.
const RELATION_CRITICAL_BONUS: f64 = 0.3;

/// Maximum recency bonus a relation's `time` attribute can add.
const RELATION_RECENCY_BONUS: f64 = 0.2;

/// Base relation score when both endpoints were selected.
const RELATION_BOTH_ENDPOINTS: f64 = 1.0;

/// Base relation score when at most one endpoint was selected.
const RELATION_ONE_ENDPOINT: f64 = 0.5;

/// Flat bonus added to critical observations.
const OBSERVATION_CRITICAL_BONUS: f64 = 0.5;

/// Fractional days between two instants.
fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 86_400_000.0
}

/// Linear recency decay: 1 at zero days, exactly 0 from the window edge
/// on. `None` (no timestamped data) scores 0.
pub fn recency_score(
    most_recent: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    window_days: i64,
) -> f64 {
    match most_recent {
        Some(timestamp) => {
            let days = days_between(timestamp, now);
            (1.0 - days / window_days as f64).max(0.0)
        }
        None => 0.0,
    }
}

/// Fraction of keywords appearing as substrings of `haystack`
/// (lowercased). Zero when there are no keywords.
fn keyword_relevance(haystack: &str, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let haystack = haystack.to_lowercase();
    let matched = keywords.iter().filter(|k| haystack.contains(*k)).count();
    matched as f64 / keywords.len() as f64
}

/// Score an entity against the extracted keywords.
///
/// Relevance matches keywords against the entity's full serialized form,
/// so name, type, categories and observation contents all count.
pub fn score_entity(
    entity: &Entity,
    keywords: &[String],
    config: &RetrievalConfig,
    now: DateTime<Utc>,
) -> (f64, ScoreBreakdown) {
    let serialized = match serde_json::to_string(entity) {
        Ok(json) => json,
        Err(err) => {
            debug!(entity = %entity.name, %err, "entity serialization failed, relevance is 0");
            String::new()
        }
    };

    let breakdown = ScoreBreakdown {
        relevance: keyword_relevance(&serialized, keywords),
        recency: recency_score(
            entity.most_recent_observation(),
            now,
            config.recency_window_days,
        ),
        confidence: mean_confidence(&entity.observations),
    };

    (weighted_total(&breakdown, config), breakdown)
}

/// Score a relation given the set of selected entity names.
pub fn score_relation(
    relation: &Relation,
    selected: &HashSet<&str>,
    config: &RetrievalConfig,
    now: DateTime<Utc>,
) -> f64 {
    let both_selected =
        selected.contains(relation.from.as_str()) && selected.contains(relation.to.as_str());
    let mut score = if both_selected {
        RELATION_BOTH_ENDPOINTS
    } else {
        RELATION_ONE_ENDPOINT
    };

    if relation.attributes.is_critical {
        score += RELATION_CRITICAL_BONUS;
    }
    score += RELATION_RECENCY_BONUS
        * recency_score(relation.attributes.time, now, config.recency_window_days);

    score
}

/// Filter, score, rank and truncate an entity's observations.
///
/// Observations below the minimum confidence are dropped. The score is
/// the weighted relevance/recency/confidence sum plus a flat critical
/// bonus; the result is sorted by descending score and truncated to the
/// per-entity maximum.
pub fn score_observations(
    observations: &[Observation],
    keywords: &[String],
    config: &RetrievalConfig,
    now: DateTime<Utc>,
) -> Vec<ScoredObservation> {
    let mut scored: Vec<ScoredObservation> = observations
        .iter()
        .filter(|o| o.confidence >= config.min_confidence)
        .map(|o| {
            let breakdown = ScoreBreakdown {
                relevance: keyword_relevance(&o.content, keywords),
                recency: recency_score(Some(o.timestamp), now, config.recency_window_days),
                confidence: o.confidence as f64 / 5.0,
            };
            let mut score = weighted_total(&breakdown, config);
            if o.is_critical {
                score += OBSERVATION_CRITICAL_BONUS;
            }
            ScoredObservation {
                observation: o.clone(),
                score,
                breakdown,
            }
        })
        .collect();

    sort_descending(&mut scored, |s| s.score);
    scored.truncate(config.max_observations_per_entity);
    scored
}

/// Score observations by recency and confidence only, for category
/// retrieval where keyword relevance is bypassed. No filtering or
/// truncation; the caller keeps every match, ordered.
pub fn score_observations_without_relevance(
    observations: &[Observation],
    config: &RetrievalConfig,
    now: DateTime<Utc>,
) -> Vec<ScoredObservation> {
    let mut scored: Vec<ScoredObservation> = observations
        .iter()
        .map(|o| {
            let breakdown = ScoreBreakdown {
                relevance: 0.0,
                recency: recency_score(Some(o.timestamp), now, config.recency_window_days),
                confidence: o.confidence as f64 / 5.0,
            };
            let mut score = breakdown.recency * config.weights.recency
                + breakdown.confidence * config.weights.confidence;
            if o.is_critical {
                score += OBSERVATION_CRITICAL_BONUS;
            }
            ScoredObservation {
                observation: o.clone(),
                score,
                breakdown,
            }
        })
        .collect();

    sort_descending(&mut scored, |s| s.score);
    scored
}

/// Mean observation confidence normalized to `[0, 1]`; 0 when there are
/// no observations.
fn mean_confidence(observations: &[Observation]) -> f64 {
    if observations.is_empty() {
        return 0.0;
    }
    let sum: u32 = observations.iter().map(|o| o.confidence as u32).sum();
    sum as f64 / observations.len() as f64 / 5.0
}

fn weighted_total(breakdown: &ScoreBreakdown, config: &RetrievalConfig) -> f64 {
    breakdown.relevance * config.weights.relevance
        + breakdown.recency * config.weights.recency
        + breakdown.confidence * config.weights.confidence
}

/// Sort by a score key, highest first, tolerating NaN-free f64 keys.
pub fn sort_descending<T, F: Fn(&T) -> f64>(items: &mut [T], key: F) {
    items.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
}
