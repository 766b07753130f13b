//! Error types for the engine.
//!
//! The only hard failure the engine surfaces is invalid configuration,
//! which fails fast at construction time. Everything else is caught at
//! the operation boundary and converted into a degraded result.

use thiserror::Error;

/// Engine error types.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
