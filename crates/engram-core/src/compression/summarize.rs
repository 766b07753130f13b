//! Cluster summarization.
//!
//! A cluster of similar observations is reduced to one compressed
//! observation carrying full provenance. The summarization strategy sits
//! behind the [`Summarizer`] trait so a stronger implementation can be
//! substituted without touching the filtering/clustering contract; the
//! bundled [`HeuristicSummarizer`] uses a fixed positional heuristic, not
//! linguistic parsing.

use std::collections::HashMap;

use tracing::warn;

use engram_contracts::{clamp_confidence, CompressedObservation, Observation};

use crate::text::tokenize;

/// Fallback confidence when a cluster somehow has no members to average.
const FALLBACK_CONFIDENCE: u8 = 3;

/// Only tokens longer than this qualify as object candidates.
const MIN_OBJECT_TOKEN_LEN: usize = 3;

/// Reduces a cluster of observations to one compressed observation.
///
/// Implementations return `None` instead of erroring: summarization sits
/// at a fault-tolerant boundary and a failed cluster is simply skipped.
pub trait Summarizer: Send + Sync {
    fn summarize(
        &self,
        cluster: &[Observation],
        entity_name: &str,
        entity_type: &str,
        category: &str,
    ) -> Option<CompressedObservation>;
}

/// Positional subject/action/object summarizer.
///
/// For each member: token 0 is the subject candidate, token 1 the action
/// candidate, and tokens 2..=4 longer than three characters the object
/// candidates. The most frequent candidate per role wins, first seen
/// breaking ties. The composed summary joins the non-empty roles and
/// appends an observation count for clusters larger than one.
#[derive(Debug, Clone, Default)]
pub struct HeuristicSummarizer;

impl HeuristicSummarizer {
    pub fn new() -> Self {
        Self
    }
}

impl Summarizer for HeuristicSummarizer {
    fn summarize(
        &self,
        cluster: &[Observation],
        entity_name: &str,
        entity_type: &str,
        category: &str,
    ) -> Option<CompressedObservation> {
        if cluster.is_empty() {
            return None;
        }

        // Most recent first; the compressed observation takes the newest
        // timestamp and lists sources in the same order.
        let mut members: Vec<&Observation> = cluster.iter().collect();
        members.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let timestamp = members[0].timestamp;
        let confidence = mean_confidence(&members);
        let is_critical = members.iter().any(|o| o.is_critical);

        let mut subjects = FrequencyVote::new();
        let mut actions = FrequencyVote::new();
        let mut objects = FrequencyVote::new();

        for member in &members {
            let tokens = tokenize(&member.content);
            if let Some(subject) = tokens.first() {
                subjects.record(subject);
            }
            if let Some(action) = tokens.get(1) {
                actions.record(action);
            }
            for object in tokens.iter().skip(2).take(3) {
                if object.len() > MIN_OBJECT_TOKEN_LEN {
                    objects.record(object);
                }
            }
        }

        let parts: Vec<String> = [subjects.winner(), actions.winner(), objects.winner()]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            warn!(
                entity = entity_name,
                category, "cluster produced no summary tokens, skipping"
            );
            return None;
        }

        let mut content = parts.join(" ");
        if members.len() > 1 {
            content.push_str(&format!(" (observed {} times)", members.len()));
        }

        let source_observations = members.iter().map(|o| o.content.clone()).collect();

        Some(CompressedObservation {
            entity_name: entity_name.to_string(),
            entity_type: entity_type.to_string(),
            category: category.to_string(),
            content,
            timestamp,
            confidence,
            is_critical,
            source_observations,
            time_window: None,
        })
    }
}

/// Round-half-up mean of member confidences.
fn mean_confidence(members: &[&Observation]) -> u8 {
    if members.is_empty() {
        return FALLBACK_CONFIDENCE;
    }
    let sum: u32 = members.iter().map(|o| o.confidence as u32).sum();
    let mean = sum as f64 / members.len() as f64;
    // f64::round is half-away-from-zero, which is half-up for the
    // positive values confidence can take.
    clamp_confidence(mean.round() as u8)
}

/// Frequency counter with first-seen tie-breaking.
struct FrequencyVote {
    counts: HashMap<String, usize>,
    order: Vec<String>,
}

impl FrequencyVote {
    fn new() -> Self {
        Self {
            counts: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn record(&mut self, token: &str) {
        let entry = self.counts.entry(token.to_string()).or_insert(0);
        if *entry == 0 {
            self.order.push(token.to_string());
        }
        *entry += 1;
    }

    /// The most frequent token; the earliest recorded wins ties.
    fn winner(&self) -> Option<String> {
        let mut best: Option<(&str, usize)> = None;
        for token in &self.order {
            let count = self.counts[token];
            if best.map(|(_, c)| count > c).unwrap_or(true) {
                best = Some((token, count));
            }
        }
        best.map(|(token, _)| token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn summarize(cluster: &[Observation]) -> Option<CompressedObservation> {
        HeuristicSummarizer::new().summarize(cluster, "alice", "person", "goal")
    }

    fn obs(content: &str, confidence: u8, age_days: i64) -> Observation {
        Observation::new(content)
            .with_confidence(confidence)
            .with_timestamp(Utc::now() - Duration::days(age_days))
    }

    #[test]
    fn test_takes_most_recent_timestamp() {
        let newer = obs("user wants reminders daily", 4, 1);
        let older = obs("user wants reminders weekly", 4, 3);
        let result = summarize(&[older.clone(), newer.clone()]).unwrap();

        assert_eq!(result.timestamp, newer.timestamp);
        // Sources listed most recent first.
        assert_eq!(
            result.source_observations,
            vec![newer.content, older.content]
        );
    }

    #[test]
    fn test_confidence_round_half_up() {
        let result = summarize(&[obs("user wants things", 3, 1), obs("user wants stuff", 4, 2)]);
        assert_eq!(result.unwrap().confidence, 4);

        let result = summarize(&[obs("user wants things", 2, 1), obs("user wants stuff", 3, 2)]);
        assert_eq!(result.unwrap().confidence, 3);
    }

    #[test]
    fn test_criticality_is_or_of_members() {
        let plain = obs("user wants things", 3, 1);
        let critical = obs("user wants stuff", 3, 2).critical();
        assert!(summarize(&[plain.clone(), critical]).unwrap().is_critical);
        assert!(!summarize(&[plain.clone(), plain]).unwrap().is_critical);
    }

    #[test]
    fn test_observed_count_suffix() {
        let result = summarize(&[
            obs("user wants reminders", 4, 1),
            obs("user wants reminders", 4, 2),
            obs("user wants reminders", 4, 3),
        ])
        .unwrap();
        assert!(result.content.ends_with("(observed 3 times)"));
    }

    #[test]
    fn test_subject_action_object_vote() {
        // subject: "user" (3x); action: "wants" (2x) beats "needs" (1x);
        // object: "reminders" (2x, len > 3) beats "alerts".
        let result = summarize(&[
            obs("user wants reminders daily", 4, 1),
            obs("user needs reminders often", 4, 2),
            obs("user wants alerts sometimes", 4, 3),
        ])
        .unwrap();
        assert!(result.content.starts_with("user wants reminders"));
    }

    #[test]
    fn test_tie_broken_by_first_seen() {
        // Actions "asked" and "liked" each appear once; the member sorted
        // first (most recent) wins.
        let newer = obs("user asked questions", 4, 1);
        let older = obs("user liked answers", 4, 2);
        let result = summarize(&[older, newer]).unwrap();
        assert!(result.content.contains("asked"));
    }

    #[test]
    fn test_short_tokens_never_objects() {
        // Third tokens are all length <= 3, so no object role is filled.
        let result = summarize(&[obs("user ran far", 4, 1), obs("user ran out", 4, 2)]).unwrap();
        assert!(result.content.starts_with("user ran (observed"));
    }

    #[test]
    fn test_empty_cluster_returns_none() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_unsummarizable_cluster_returns_none() {
        let result = summarize(&[obs("...", 4, 1), obs("---", 4, 2)]);
        assert!(result.is_none());
    }

    #[test]
    fn test_provenance_lists_every_member() {
        let cluster: Vec<_> = (0..4)
            .map(|i| obs(&format!("user wants item{i}"), 4, i))
            .collect();
        let result = summarize(&cluster).unwrap();
        assert_eq!(result.source_observations.len(), 4);
    }
}
