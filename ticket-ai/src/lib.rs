//! Similarity-grounded recommendation subsystem.
//!
//! Ticket descriptions are embedded, indexed in a vector store, and the
//! nearest resolved tickets ground an LLM-generated handling
//! recommendation that may only cite retrieved ticket ids.
//!
//! [`AiService`] is the single entry point. All providers are injected as
//! trait objects; when the environment carries no provider configuration
//! the service still constructs and every AI operation degrades to an
//! empty/absent result, keeping the core ticketing flow available.

mod config;
mod error;
mod labels;
mod providers;
mod recommend;
mod reindex;
mod similarity;
mod tags;
mod traits;

pub use config::AiConfig;
pub use error::AiError;
pub use reindex::ReindexReport;
pub use similarity::Candidate;
pub use traits::{Embedder, TextGenerator, VectorSearch};

use std::sync::Arc;

use tokio::time::timeout;
use tracing::{debug, warn};

use llm_service::LlmProfiles;
use ticket_store::TicketRepository;
use vector_index::{IndexConfig, TicketVectorIndex};

/// Facade over the AI pipeline: embedding storage, similarity search,
/// grounded recommendations, tag suggestions, and bulk reindex.
///
/// Construct once and share behind an `Arc`.
pub struct AiService {
    cfg: AiConfig,
    embedder: Option<Arc<dyn Embedder>>,
    index: Option<Arc<dyn VectorSearch>>,
    generator: Option<Arc<dyn TextGenerator>>,
    repo: Arc<dyn TicketRepository>,
}

impl AiService {
    /// Creates the service from explicit dependencies.
    ///
    /// Pass `None` for providers that are not configured; the affected
    /// operations then degrade instead of failing.
    pub fn new(
        cfg: AiConfig,
        embedder: Option<Arc<dyn Embedder>>,
        index: Option<Arc<dyn VectorSearch>>,
        generator: Option<Arc<dyn TextGenerator>>,
        repo: Arc<dyn TicketRepository>,
    ) -> Self {
        Self {
            cfg,
            embedder,
            index,
            generator,
            repo,
        }
    }

    /// Wires the production providers from environment variables.
    ///
    /// Missing provider configuration is logged and leaves the matching
    /// slot empty; it is never an error.
    pub fn from_env(repo: Arc<dyn TicketRepository>) -> Self {
        let cfg = AiConfig::from_env();

        let llm: Option<Arc<LlmProfiles>> = match LlmProfiles::from_env() {
            Ok(p) => Some(Arc::new(p)),
            Err(err) => {
                warn!(error = %err, "LLM provider not configured; generation and embeddings disabled");
                None
            }
        };

        let index: Option<Arc<TicketVectorIndex>> = match IndexConfig::from_env()
            .and_then(TicketVectorIndex::new)
        {
            Ok(i) => Some(Arc::new(i)),
            Err(err) => {
                warn!(error = %err, "vector index not configured; similarity search disabled");
                None
            }
        };

        Self::new(
            cfg,
            llm.clone().map(|p| p as Arc<dyn Embedder>),
            index.map(|i| i as Arc<dyn VectorSearch>),
            llm.map(|p| p as Arc<dyn TextGenerator>),
            repo,
        )
    }

    /// Generates and stores the embedding for a ticket description.
    ///
    /// Best-effort: returns `false` on missing configuration, empty
    /// description, provider failure, or timeout. Never raises.
    pub async fn store_embedding(&self, ticket_id: &str, description: &str) -> bool {
        let (Some(embedder), Some(index)) = (self.embedder(), self.index()) else {
            debug!(ticket_id, "embedding storage skipped: AI providers not configured");
            return false;
        };
        if description.trim().is_empty() {
            return false;
        }

        let budget = self.cfg.embedding_timeout;
        let vector = match timeout(budget, embedder.embed(description)).await {
            Err(_) => {
                warn!(ticket_id, "timeout generating embedding");
                return false;
            }
            Ok(Err(err)) => {
                warn!(ticket_id, error = %err, "error generating embedding");
                return false;
            }
            Ok(Ok(v)) => v,
        };

        let budget = self.cfg.vector_timeout;
        match timeout(budget, index.upsert(ticket_id, vector)).await {
            Err(_) => {
                warn!(ticket_id, "timeout storing embedding");
                false
            }
            Ok(Err(err)) => {
                warn!(ticket_id, error = %err, "error storing embedding");
                false
            }
            Ok(Ok(())) => {
                debug!(ticket_id, "embedding stored");
                true
            }
        }
    }

    /// Removes a ticket's entry from the vector index (ticket deletion).
    ///
    /// Best-effort like [`AiService::store_embedding`].
    pub async fn remove_embedding(&self, ticket_id: &str) -> bool {
        let Some(index) = self.index() else {
            return false;
        };

        let budget = self.cfg.vector_timeout;
        match timeout(budget, index.delete(ticket_id)).await {
            Err(_) => {
                warn!(ticket_id, "timeout deleting embedding");
                false
            }
            Ok(Err(err)) => {
                warn!(ticket_id, error = %err, "error deleting embedding");
                false
            }
            Ok(Ok(())) => true,
        }
    }

    /// Finds up to `limit` resolved tickets similar to `description`.
    ///
    /// # Errors
    /// Timeouts surface as the dedicated [`AiError`] variants so callers
    /// can tell infrastructure unavailability from an empty result; other
    /// provider failures yield `Ok(vec![])`.
    pub async fn find_similar_tickets(
        &self,
        description: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>, AiError> {
        similarity::find_similar(self, description, limit).await
    }

    /// Generates a handling recommendation grounded in similar resolved
    /// tickets. `None` when the ticket does not exist or the pipeline is
    /// degraded; never raises.
    pub async fn generate_recommendation(&self, ticket_id: &str) -> Option<String> {
        recommend::generate_recommendation(self, ticket_id).await
    }

    /// Suggests 0–5 short tags for a ticket. Empty on any failure.
    pub async fn generate_tags(
        &self,
        description: &str,
        category: &str,
        system_source: &str,
    ) -> Vec<String> {
        tags::generate_tags(self, description, category, system_source).await
    }

    /// Rebuilds the whole vector index from the record store.
    ///
    /// # Errors
    /// Returns [`AiError::Store`] if the ticket scan fails.
    pub async fn reindex_all(&self) -> Result<ReindexReport, AiError> {
        reindex::reindex_all(self).await
    }

    /* --------------------- Crate-internal accessors --------------------- */

    pub(crate) fn config(&self) -> &AiConfig {
        &self.cfg
    }

    pub(crate) fn embedder(&self) -> Option<&Arc<dyn Embedder>> {
        self.embedder.as_ref()
    }

    pub(crate) fn index(&self) -> Option<&Arc<dyn VectorSearch>> {
        self.index.as_ref()
    }

    pub(crate) fn generator(&self) -> Option<&Arc<dyn TextGenerator>> {
        self.generator.as_ref()
    }

    pub(crate) fn repo(&self) -> &Arc<dyn TicketRepository> {
        &self.repo
    }
}
