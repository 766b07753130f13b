//! Error types for graph collaborator operations.

use thiserror::Error;

/// Graph collaborator error types.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("graph store unavailable: {0}")]
    Unavailable(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
