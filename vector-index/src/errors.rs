//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for vector index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Mismatch between a vector and the collection dimensionality.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),
}
