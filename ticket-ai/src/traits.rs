//! Provider seams for the AI pipeline.
//!
//! The subsystem never talks to concrete clients directly; everything goes
//! through these traits so tests can substitute fakes without touching
//! process state. [`crate::providers`] adapts the production clients.

use async_trait::async_trait;
use vector_index::ScoredTicket;

/// Turns text into a fixed-dimension embedding vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}

/// Prompt-to-text generation provider.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Vector index keyed by external ticket identifier.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// Insert or replace the embedding for `ticket_id`; net effect of
    /// repeated calls is exactly one live entry.
    async fn upsert(&self, ticket_id: &str, vector: Vec<f32>) -> anyhow::Result<()>;

    /// Top-K nearest neighbours by descending cosine similarity.
    async fn search(&self, vector: Vec<f32>, top_k: usize) -> anyhow::Result<Vec<ScoredTicket>>;

    /// Remove the entry for `ticket_id` (absent entries are not an error).
    async fn delete(&self, ticket_id: &str) -> anyhow::Result<()>;
}
