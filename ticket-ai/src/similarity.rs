//! Similarity search: embed the query, hit the vector index, join the
//! results against the primary record store.

use std::collections::HashMap;

use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::AiService;
use crate::error::AiError;

/// A historical ticket proposed as similar to the query, with the cosine
/// score attached. Built per-query and never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub ticket_id: String,
    /// Similarity score from the vector index. Every joined ticket is
    /// expected to carry one; a missing score is left as `None` rather
    /// than dropping the candidate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    pub description: String,
    pub handle_detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution_template: Option<String>,
}

/// Finds up to `limit` resolved tickets similar to `description`.
///
/// The vector index is over-fetched at `2 × limit` because it knows nothing
/// about ticket status or resolution fields; the eligibility filter runs
/// against the record store afterwards, and the over-fetch keeps `limit`
/// from under-filling. No minimum-similarity threshold is applied.
///
/// # Errors
/// - [`AiError::EmbeddingTimeout`] / [`AiError::SearchTimeout`] when a
///   provider step exceeds its budget (the caller must be able to tell
///   this apart from "no similar tickets")
/// - [`AiError::Store`] if the record-store join fails
///
/// Any other provider failure degrades to `Ok(vec![])`.
pub(crate) async fn find_similar(
    svc: &AiService,
    description: &str,
    limit: usize,
) -> Result<Vec<Candidate>, AiError> {
    if description.trim().is_empty() || limit == 0 {
        return Ok(Vec::new());
    }

    let (Some(embedder), Some(index)) = (svc.embedder(), svc.index()) else {
        debug!("similarity search skipped: AI providers not configured");
        return Ok(Vec::new());
    };

    info!(query_len = description.len(), limit, "similarity search started");

    let budget = svc.config().embedding_timeout;
    let vector = match timeout(budget, embedder.embed(description)).await {
        Err(_) => return Err(AiError::EmbeddingTimeout(budget)),
        Ok(Err(err)) => {
            warn!(error = %err, "embedding failed, returning empty result");
            return Ok(Vec::new());
        }
        Ok(Ok(v)) => v,
    };

    let budget = svc.config().vector_timeout;
    let hits = match timeout(budget, index.search(vector, limit * 2)).await {
        Err(_) => return Err(AiError::SearchTimeout(budget)),
        Ok(Err(err)) => {
            warn!(error = %err, "vector search failed, returning empty result");
            return Ok(Vec::new());
        }
        Ok(Ok(h)) => h,
    };

    debug!(hits = hits.len(), "vector index returned neighbours");
    if hits.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<String> = hits.iter().map(|h| h.ticket_id.clone()).collect();
    let scores: HashMap<&str, f32> = hits
        .iter()
        .map(|h| (h.ticket_id.as_str(), h.score))
        .collect();

    let tickets = svc.repo().find_resolved_in(&ids, limit).await?;

    let candidates: Vec<Candidate> = tickets
        .into_iter()
        .map(|t| Candidate {
            score: scores.get(t.id.as_str()).copied(),
            ticket_id: t.id,
            description: t.description,
            handle_detail: t.handle_detail,
            solution_template: t.solution_template,
        })
        .collect();

    info!(results = candidates.len(), "similarity search completed");
    Ok(candidates)
}
