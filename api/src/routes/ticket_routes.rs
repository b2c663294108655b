//! Ticket CRUD routes.
//!
//! Vector-index synchronization is best-effort and off the request path:
//! create/update spawn an embedding upsert, delete spawns an index removal,
//! and a failure only leaves a warning plus a stale cache that the next
//! reindex repairs.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Serialize;
use tracing::warn;

use ticket_store::{CreateTicket, Ticket, TicketFilter, UpdateTicket};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketListResponse {
    pub items: Vec<Ticket>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
    pub id: String,
}

pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CreateTicket>,
) -> AppResult<Response> {
    let ticket = state.repo.create(input).await?;

    spawn_store_embedding(&state, ticket.id.clone(), ticket.description.clone());

    Ok(ApiResponse::success(ticket).into_response_with_status(StatusCode::CREATED))
}

pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(mut filter): Query<TicketFilter>,
) -> AppResult<Response> {
    filter.page = filter.page.max(1);
    filter.page_size = filter.page_size.clamp(1, 100);

    let page = filter.page;
    let page_size = filter.page_size;
    let result = state.repo.list(filter).await?;

    let body = TicketListResponse {
        total: result.total,
        total_pages: result.total.div_ceil(page_size),
        items: result.items,
        page,
        page_size,
    };
    Ok(ApiResponse::success(body).into_response_with_status(StatusCode::OK))
}

pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let ticket = state.repo.get_by_id(&id).await?.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(ticket).into_response_with_status(StatusCode::OK))
}

pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTicket>,
) -> AppResult<Response> {
    let description_changed = input.description.is_some();

    let ticket = state
        .repo
        .update(&id, input)
        .await?
        .ok_or(AppError::NotFound)?;

    if description_changed {
        spawn_store_embedding(&state, ticket.id.clone(), ticket.description.clone());
    }

    Ok(ApiResponse::success(ticket).into_response_with_status(StatusCode::OK))
}

pub async fn close_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let ticket = state.repo.close(&id).await?.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(ticket).into_response_with_status(StatusCode::OK))
}

pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    if !state.repo.delete(&id).await? {
        return Err(AppError::NotFound);
    }

    let ai = state.ai.clone();
    let ticket_id = id.clone();
    tokio::spawn(async move {
        ai.remove_embedding(&ticket_id).await;
    });

    let body = MessageResponse {
        message: "Ticket deleted successfully".into(),
        id,
    };
    Ok(ApiResponse::success(body).into_response_with_status(StatusCode::OK))
}

/// Kicks off embedding population without blocking the write path.
fn spawn_store_embedding(state: &Arc<AppState>, id: String, description: String) {
    let ai = state.ai.clone();
    tokio::spawn(async move {
        if !ai.store_embedding(&id, &description).await {
            warn!(ticket_id = %id, "embedding population failed; a reindex will recover it");
        }
    });
}
