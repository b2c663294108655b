//! Adapters wiring the production clients onto the provider traits.

use async_trait::async_trait;
use llm_service::LlmProfiles;
use vector_index::{ScoredTicket, TicketVectorIndex};

use crate::traits::{Embedder, TextGenerator, VectorSearch};

#[async_trait]
impl Embedder for LlmProfiles {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(LlmProfiles::embed(self, text).await?)
    }
}

#[async_trait]
impl TextGenerator for LlmProfiles {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        Ok(LlmProfiles::generate(self, prompt).await?)
    }
}

#[async_trait]
impl VectorSearch for TicketVectorIndex {
    async fn upsert(&self, ticket_id: &str, vector: Vec<f32>) -> anyhow::Result<()> {
        Ok(TicketVectorIndex::upsert(self, ticket_id, vector).await?)
    }

    async fn search(&self, vector: Vec<f32>, top_k: usize) -> anyhow::Result<Vec<ScoredTicket>> {
        Ok(TicketVectorIndex::search(self, vector, top_k, None).await?)
    }

    async fn delete(&self, ticket_id: &str) -> anyhow::Result<()> {
        Ok(TicketVectorIndex::delete(self, ticket_id).await?)
    }
}
