//! Retrieval pipeline: keyword extraction, scoring and selection.
//!
//! ```text
//! Context ──► extract_keywords ──► gather candidates (GraphStore)
//!                                        │
//!                                  score entities
//!                                  rank + truncate
//!                                        │
//!                              filter observations per entity
//!                              gather + score + rank relations
//!                                        │
//!                                 RetrievalResult
//! ```

mod keywords;
mod scorer;
mod selector;

pub use keywords::{extract_keywords, Context, MAX_KEYWORDS};
pub use scorer::{
    recency_score, score_entity, score_observations, score_observations_without_relevance,
    score_relation,
};
pub use selector::RetrievalEngine;
