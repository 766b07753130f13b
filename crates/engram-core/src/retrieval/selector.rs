//! Ranked retrieval and specialized retrieval modes.
//!
//! The selector gathers candidate entities from the graph collaborator,
//! applies the scorer and returns ranked, truncated results. Every
//! operation catches collaborator failures at its boundary and returns a
//! degraded result instead of propagating; the memory subsystem must
//! never crash the conversation flow.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info, warn};

use engram_contracts::{
    CategoryRetrieval, CriticalRetrieval, Entity, Relation, RetrievalResult, ScoredEntity,
    ScoredRelation, TimeRange, TimeRangeRetrieval,
};
use engram_traits::GraphStore;

use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::retrieval::keywords::{extract_keywords, Context};
use crate::retrieval::scorer::{
    score_entity, score_observations, score_observations_without_relevance, score_relation,
    sort_descending,
};

/// The retrieval engine.
///
/// Stateless: each call computes scores fresh from collaborator data.
/// Construction validates the configuration, which is the only hard
/// failure.
pub struct RetrievalEngine {
    config: RetrievalConfig,
}

impl RetrievalEngine {
    /// Create an engine, failing fast on invalid configuration.
    pub fn new(config: RetrievalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create an engine with default configuration.
    pub fn with_default_config() -> Self {
        Self {
            config: RetrievalConfig::default(),
        }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Retrieve the memories most relevant to a context.
    ///
    /// Extracts keywords from the context, gathers candidates (the named
    /// targets, or the whole graph when none are given), scores and ranks
    /// entities, filters each selected entity's observations, then
    /// gathers, scores and ranks the selected entities' relations.
    pub async fn retrieve_relevant(
        &self,
        graph: &dyn GraphStore,
        context: &Context,
        target_entities: &[String],
    ) -> RetrievalResult {
        let now = Utc::now();
        let keywords = extract_keywords(context);
        debug!(?keywords, "extracted context keywords");

        let candidates = match self.gather_candidates(graph, target_entities).await {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!(%err, "candidate gathering failed, returning degraded result");
                return RetrievalResult::degraded(err);
            }
        };

        // Rank entities and keep the top maxEntities.
        let mut scored: Vec<ScoredEntity> = candidates
            .into_iter()
            .map(|entity| {
                let (score, breakdown) = score_entity(&entity, &keywords, &self.config, now);
                ScoredEntity {
                    entity,
                    score,
                    breakdown,
                }
            })
            .collect();
        sort_descending(&mut scored, |s| s.score);
        scored.truncate(self.config.max_entities);

        // Filter and rank each selected entity's observations.
        for item in &mut scored {
            let kept = score_observations(&item.entity.observations, &keywords, &self.config, now);
            item.entity.observations = kept.into_iter().map(|s| s.observation).collect();
        }

        let selected: HashSet<&str> = scored.iter().map(|s| s.entity.name.as_str()).collect();
        let relations = self.gather_relations(graph, &selected).await;
        let mut relations: Vec<ScoredRelation> = relations
            .into_iter()
            .map(|relation| {
                let score = score_relation(&relation, &selected, &self.config, now);
                ScoredRelation { relation, score }
            })
            .collect();
        sort_descending(&mut relations, |s| s.score);
        relations.truncate(self.config.max_relations);

        info!(
            entities = scored.len(),
            relations = relations.len(),
            "ranked retrieval complete"
        );
        RetrievalResult {
            entities: scored,
            relations,
            error: None,
        }
    }

    /// Retrieve observations of a single category.
    ///
    /// Keyword relevance is bypassed; matching observations are ordered
    /// by recency and confidence (critical observations get the flat
    /// bonus). Entities without a matching observation are dropped.
    pub async fn retrieve_by_category(
        &self,
        graph: &dyn GraphStore,
        category: &str,
        entity_names: &[String],
    ) -> CategoryRetrieval {
        let now = Utc::now();
        let candidates = match self.gather_candidates(graph, entity_names).await {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!(%err, category, "category retrieval degraded");
                return CategoryRetrieval {
                    category: category.to_string(),
                    entities: Vec::new(),
                    error: Some(err),
                };
            }
        };

        let mut entities = Vec::new();
        for mut entity in candidates {
            let matching: Vec<_> = entity
                .observations
                .iter()
                .filter(|o| o.category == category)
                .cloned()
                .collect();
            if matching.is_empty() {
                continue;
            }
            let scored = score_observations_without_relevance(&matching, &self.config, now);
            // The entity's ordering key is its best observation score.
            let best = scored.first().map(|s| s.score).unwrap_or(0.0);
            let breakdown = scored
                .first()
                .map(|s| s.breakdown)
                .unwrap_or_default();
            entity.observations = scored.into_iter().map(|s| s.observation).collect();
            entities.push(ScoredEntity {
                entity,
                score: best,
                breakdown,
            });
        }
        sort_descending(&mut entities, |s| s.score);

        CategoryRetrieval {
            category: category.to_string(),
            entities,
            error: None,
        }
    }

    /// Retrieve every critical observation and relation.
    ///
    /// No ranking, no truncation: criticality is binary and all matches
    /// are returned in gathering order.
    pub async fn retrieve_critical(
        &self,
        graph: &dyn GraphStore,
        entity_names: &[String],
    ) -> CriticalRetrieval {
        let candidates = match self.gather_candidates(graph, entity_names).await {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!(%err, "critical retrieval degraded");
                return CriticalRetrieval {
                    entities: Vec::new(),
                    relations: Vec::new(),
                    error: Some(err),
                };
            }
        };

        // Relations are scoped to the full candidate set: a critical
        // relation counts even when its endpoints kept no critical
        // observations.
        let names: HashSet<&str> = candidates.iter().map(|e| e.name.as_str()).collect();
        let mut relations = self.gather_relations(graph, &names).await;
        relations.retain(|r| r.attributes.is_critical);

        let mut entities = Vec::new();
        for mut entity in candidates {
            entity.observations.retain(|o| o.is_critical);
            if !entity.observations.is_empty() {
                entities.push(entity);
            }
        }

        CriticalRetrieval {
            entities,
            relations,
            error: None,
        }
    }

    /// Retrieve observations and relations within a time range.
    ///
    /// Bounds are inclusive; an unset start means the epoch and an unset
    /// end means now. Relations without a `time` attribute fall outside
    /// every range. No ranking is applied.
    pub async fn retrieve_by_time_range(
        &self,
        graph: &dyn GraphStore,
        time_range: TimeRange,
        entity_names: &[String],
    ) -> TimeRangeRetrieval {
        let now = Utc::now();
        let candidates = match self.gather_candidates(graph, entity_names).await {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!(%err, "time range retrieval degraded");
                return TimeRangeRetrieval {
                    time_range,
                    entities: Vec::new(),
                    relations: Vec::new(),
                    error: Some(err),
                };
            }
        };

        // As in critical retrieval, relations are scoped to the full
        // candidate set, not just entities with in-range observations.
        let names: HashSet<&str> = candidates.iter().map(|e| e.name.as_str()).collect();
        let mut relations = self.gather_relations(graph, &names).await;
        relations.retain(|r| {
            r.attributes
                .time
                .map(|t| time_range.contains(t, now))
                .unwrap_or(false)
        });

        let mut entities = Vec::new();
        for mut entity in candidates {
            entity
                .observations
                .retain(|o| time_range.contains(o.timestamp, now));
            if !entity.observations.is_empty() {
                entities.push(entity);
            }
        }

        TimeRangeRetrieval {
            time_range,
            entities,
            relations,
            error: None,
        }
    }

    /// Gather candidate entities: the named targets when given, the full
    /// graph export otherwise.
    ///
    /// A failed or absent individual target lookup is logged and skipped;
    /// only a failed export degrades the whole operation, since it leaves
    /// no candidates at all.
    async fn gather_candidates(
        &self,
        graph: &dyn GraphStore,
        target_entities: &[String],
    ) -> std::result::Result<Vec<Entity>, String> {
        if target_entities.is_empty() {
            return match graph.export_graph().await {
                Ok(snapshot) => Ok(snapshot.entities),
                Err(err) => Err(format!("graph export failed: {err}")),
            };
        }

        let mut candidates = Vec::new();
        for name in target_entities {
            match graph.get_entity(name).await {
                Ok(Some(entity)) => candidates.push(entity),
                Ok(None) => debug!(entity = %name, "target entity not found, skipping"),
                Err(err) => warn!(entity = %name, %err, "target entity lookup failed, skipping"),
            }
        }
        Ok(candidates)
    }

    /// Gather the relations of the selected entities, deduplicated on the
    /// (from, relation_type, to) identity triple, first seen kept.
    /// Individual failures are logged and skipped.
    async fn gather_relations(
        &self,
        graph: &dyn GraphStore,
        selected: &HashSet<&str>,
    ) -> Vec<Relation> {
        let mut seen: HashSet<(String, String, String)> = HashSet::new();
        let mut relations = Vec::new();

        // Deterministic iteration: sort the selected names.
        let mut names: Vec<&str> = selected.iter().copied().collect();
        names.sort_unstable();

        for name in names {
            match graph.get_entity_relations(name).await {
                Ok(found) => {
                    for relation in found {
                        let identity = (
                            relation.from.clone(),
                            relation.relation_type.clone(),
                            relation.to.clone(),
                        );
                        if seen.insert(identity) {
                            relations.push(relation);
                        }
                    }
                }
                Err(err) => warn!(entity = %name, %err, "relation lookup failed, skipping"),
            }
        }
        relations
    }
}
