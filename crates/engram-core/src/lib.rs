//! Engram Core - Compression & Retrieval Scoring Engine
//!
//! This crate provides:
//! - Compression pipeline: eligibility filtering, similarity clustering
//!   and heuristic summarization of redundant observations
//! - Temporal compression over fixed-size day windows
//! - Retrieval pipeline: keyword extraction, multi-factor scoring
//!   (relevance / recency / confidence) and ranked selection
//! - Specialized retrieval modes (by category, critical-only, time range)
//!
//! Both pipelines are pure functions over data passed in; the only source
//! of entity/relation data is a [`engram_traits::GraphStore`]
//! collaborator. Internal failures degrade to empty results instead of
//! propagating - the memory subsystem must never crash the conversation
//! flow.

pub mod compression;
pub mod config;
pub mod error;
pub mod retrieval;
pub mod text;

// Re-export commonly used types
pub use compression::{
    cluster_by_similarity, token_set_similarity, CompressionEngine, CompressionStats,
    HeuristicSummarizer, ObservationGroup, Summarizer,
};
pub use config::{CompressionConfig, RetrievalConfig, ScoringWeights};
pub use error::{EngineError, Result};
pub use retrieval::{extract_keywords, Context, RetrievalEngine};
