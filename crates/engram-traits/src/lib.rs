//! Engram Traits - capability interfaces for the memory engine.
//!
//! This crate defines the narrow read interface the engine consumes from
//! a graph store, plus an in-memory reference implementation suitable for
//! tests, demos and small orchestrators. Real backends are provided by
//! downstream crates.

pub mod error;
pub mod graph;
pub mod memory;

pub use error::{GraphError, Result};
pub use graph::GraphStore;
pub use memory::InMemoryGraph;
