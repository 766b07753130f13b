//! Eligibility filtering and grouping for the compression pipeline.
//!
//! Observations are screened item by item (critical exemption, minimum
//! confidence, maximum age) and the survivors grouped by owning entity
//! and category. Groups below the compression threshold are dropped:
//! compression never triggers on small groups.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use engram_contracts::{Observation, PendingObservation, CATEGORY_GENERAL};

use crate::config::CompressionConfig;

/// Eligible observations for one `entity:category` group.
#[derive(Debug, Clone)]
pub struct ObservationGroup {
    pub entity_name: String,
    pub entity_type: String,
    pub category: String,
    pub observations: Vec<Observation>,
}

impl ObservationGroup {
    /// The grouping key, `"{entity}:{category}"`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.entity_name, self.category)
    }
}

/// Apply the eligibility rules and group survivors by entity + category.
///
/// Rules, in order: critical exemption (when `preserve_critical`),
/// `confidence < min_confidence`, age beyond `max_observation_age_days`.
/// Items with empty content are malformed and skipped without failing the
/// batch. Groups keep first-seen order so the pipeline stays
/// deterministic; groups smaller than `compression_threshold` are
/// dropped.
pub fn group_eligible(
    pending: &[PendingObservation],
    config: &CompressionConfig,
    now: DateTime<Utc>,
) -> Vec<ObservationGroup> {
    let cutoff = now - Duration::days(config.max_observation_age_days);

    let mut groups: Vec<ObservationGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in pending {
        let obs = &item.observation;

        if obs.content.trim().is_empty() {
            debug!(entity = %item.entity_name, "skipping malformed observation with empty content");
            continue;
        }
        if config.preserve_critical && obs.is_critical {
            continue;
        }
        if obs.confidence < config.min_confidence {
            continue;
        }
        if obs.timestamp < cutoff {
            continue;
        }

        let category = if obs.category.is_empty() {
            CATEGORY_GENERAL
        } else {
            obs.category.as_str()
        };
        let key = format!("{}:{}", item.entity_name, category);

        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(ObservationGroup {
                entity_name: item.entity_name.clone(),
                entity_type: item.entity_type.clone(),
                category: category.to_string(),
                observations: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].observations.push(obs.clone());
    }

    groups.retain(|g| g.observations.len() >= config.compression_threshold);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(entity: &str, obs: Observation) -> PendingObservation {
        PendingObservation::new(entity, "person", obs)
    }

    fn recent(content: &str) -> Observation {
        Observation::new(content).with_confidence(4)
    }

    fn config(threshold: usize) -> CompressionConfig {
        CompressionConfig::default().with_compression_threshold(threshold)
    }

    #[test]
    fn test_groups_by_entity_and_category() {
        let items = vec![
            pending("alice", recent("a1").with_category("goal")),
            pending("alice", recent("a2").with_category("goal")),
            pending("bob", recent("b1").with_category("goal")),
            pending("alice", recent("a3").with_category("preference")),
        ];
        let groups = group_eligible(&items, &config(2), Utc::now());

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key(), "alice:goal");
        assert_eq!(groups[0].observations.len(), 2);
    }

    #[test]
    fn test_critical_exempt_when_preserving() {
        let items = vec![
            pending("alice", recent("c1").critical()),
            pending("alice", recent("c2").critical()),
        ];
        let groups = group_eligible(&items, &config(2), Utc::now());
        assert!(groups.is_empty());

        let cfg = config(2).with_preserve_critical(false);
        let groups = group_eligible(&items, &cfg, Utc::now());
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_low_confidence_excluded() {
        let items = vec![
            pending("alice", recent("x1").with_confidence(2)),
            pending("alice", recent("x2")),
            pending("alice", recent("x3")),
        ];
        let groups = group_eligible(&items, &config(2), Utc::now());
        assert_eq!(groups[0].observations.len(), 2);
    }

    #[test]
    fn test_old_observations_excluded() {
        let now = Utc::now();
        let stale = recent("stale").with_timestamp(now - Duration::days(8));
        let fresh = recent("fresh").with_timestamp(now - Duration::days(1));
        let items = vec![
            pending("alice", stale),
            pending("alice", fresh.clone()),
            pending("alice", fresh),
        ];
        let groups = group_eligible(&items, &config(2), now);
        assert_eq!(groups[0].observations.len(), 2);
    }

    #[test]
    fn test_small_groups_dropped() {
        let items = vec![
            pending("alice", recent("a1")),
            pending("alice", recent("a2")),
        ];
        assert!(group_eligible(&items, &config(5), Utc::now()).is_empty());
        assert_eq!(group_eligible(&items, &config(2), Utc::now()).len(), 1);
    }

    #[test]
    fn test_empty_content_skipped() {
        let items = vec![
            pending("alice", recent("   ")),
            pending("alice", recent("ok1")),
            pending("alice", recent("ok2")),
        ];
        let groups = group_eligible(&items, &config(2), Utc::now());
        assert_eq!(groups[0].observations.len(), 2);
    }

    #[test]
    fn test_empty_category_defaults_to_general() {
        let mut obs = recent("fact");
        obs.category = String::new();
        let items = vec![
            pending("alice", obs.clone()),
            pending("alice", obs),
        ];
        let groups = group_eligible(&items, &config(2), Utc::now());
        assert_eq!(groups[0].key(), "alice:general");
    }

    #[test]
    fn test_first_seen_group_order() {
        let items = vec![
            pending("zeta", recent("z1")),
            pending("alpha", recent("a1")),
            pending("zeta", recent("z2")),
            pending("alpha", recent("a2")),
        ];
        let groups = group_eligible(&items, &config(2), Utc::now());
        let keys: Vec<_> = groups.iter().map(|g| g.entity_name.clone()).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }
}
