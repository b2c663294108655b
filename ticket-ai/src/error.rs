//! Unified error types for the crate.

use std::time::Duration;

use thiserror::Error;
use ticket_store::StoreError;

/// Errors surfaced by the interactive similarity-search path.
///
/// Timeouts get their own variants because callers must be able to tell
/// "the search infrastructure is unavailable" from "no similar tickets
/// exist"; every other provider failure degrades to an empty result before
/// it reaches this type.
#[derive(Debug, Error)]
pub enum AiError {
    /// The embedding step exceeded its budget.
    #[error("similarity search timed out: embedding step exceeded {0:?}")]
    EmbeddingTimeout(Duration),

    /// The vector index round trip exceeded its budget.
    #[error("similarity search timed out: vector index step exceeded {0:?}")]
    SearchTimeout(Duration),

    /// The join against the primary record store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AiError {
    /// Whether this error is one of the timeout variants.
    pub fn is_timeout(&self) -> bool {
        matches!(self, AiError::EmbeddingTimeout(_) | AiError::SearchTimeout(_))
    }
}
