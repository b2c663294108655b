//! AI routes: similarity search, grounded recommendation, tag suggestion,
//! and the admin reindex trigger.
//!
//! Recommendation and tags answer a degraded (empty/absent) payload rather
//! than a 5xx when the AI pipeline is down; only a similarity-search
//! timeout maps to an error status, so clients can tell "search
//! unavailable" from "no similar tickets".

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use ticket_ai::Candidate;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
};

#[derive(Deserialize)]
pub struct SimilarParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    5
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarTicketsResponse {
    pub ticket_id: String,
    pub results: Vec<Candidate>,
}

#[derive(Serialize)]
pub struct RecommendationResponse {
    pub recommendation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRequest {
    pub description: String,
    pub category: String,
    pub system_source: String,
}

#[derive(Serialize)]
pub struct TagResponse {
    pub tags: Vec<String>,
}

pub async fn similar_tickets(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<SimilarParams>,
) -> AppResult<Response> {
    let ticket = state.repo.get_by_id(&id).await?.ok_or(AppError::NotFound)?;

    let results = state
        .ai
        .find_similar_tickets(&ticket.description, params.limit.max(1))
        .await?;

    debug!(ticket_id = %id, hits = results.len(), "similar tickets served");

    let body = SimilarTicketsResponse {
        ticket_id: ticket.id,
        results,
    };
    Ok(ApiResponse::success(body).into_response_with_status(StatusCode::OK))
}

pub async fn recommend_handling(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    // Distinguish "unknown ticket" (404) from "pipeline degraded" (null).
    state.repo.get_by_id(&id).await?.ok_or(AppError::NotFound)?;

    let recommendation = state.ai.generate_recommendation(&id).await;
    let body = RecommendationResponse { recommendation };
    Ok(ApiResponse::success(body).into_response_with_status(StatusCode::OK))
}

pub async fn generate_tags(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TagRequest>,
) -> AppResult<Response> {
    let tags = state
        .ai
        .generate_tags(&req.description, &req.category, &req.system_source)
        .await;

    Ok(ApiResponse::success(TagResponse { tags }).into_response_with_status(StatusCode::OK))
}

pub async fn reindex_embeddings(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let report = state.ai.reindex_all().await.map_err(AppError::from)?;
    Ok(ApiResponse::success(report).into_response_with_status(StatusCode::OK))
}
