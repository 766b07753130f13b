//! Engram Contracts - Shared data contracts for the memory engine
//!
//! This crate defines the boundary types exchanged between the memory
//! engine, the graph collaborator, and the orchestrator:
//! - Observations (raw and compressed) with confidence and criticality
//! - Entities and relations as exposed by the graph collaborator
//! - Scored results produced by the retrieval pipeline
//!
//! All types are plain serde-serializable data; no behavior beyond
//! construction helpers and invariant clamping lives here.

pub mod graph;
pub mod observation;
pub mod scored;

pub use graph::{Entity, GraphSnapshot, Relation, RelationAttributes};
pub use observation::{
    clamp_confidence, CompressedObservation, Observation, PendingObservation, CATEGORY_GENERAL,
    MAX_CONFIDENCE, MIN_CONFIDENCE,
};
pub use scored::{
    CategoryRetrieval, CriticalRetrieval, RetrievalResult, ScoreBreakdown, ScoredEntity,
    ScoredObservation, ScoredRelation, TimeRange, TimeRangeRetrieval,
};
