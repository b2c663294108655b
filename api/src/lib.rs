use std::{env, error::Error, sync::Arc};

mod core;
mod error_handler;
mod routes;

pub use crate::core::app_state::AppState;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tracing::info;

use ticket_ai::AiService;
use ticket_store::{MongoTicketStore, TicketRepository};

use crate::routes::{
    ai_routes::{generate_tags, recommend_handling, reindex_embeddings, similar_tickets},
    ticket_routes::{
        close_ticket, create_ticket, delete_ticket, get_ticket, list_tickets, update_ticket,
    },
};

/// Builds the application router over a prepared state.
///
/// Split out of [`start`] so tests can drive the routes against in-memory
/// dependencies.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/tickets", post(create_ticket).get(list_tickets))
        .route(
            "/api/tickets/{id}",
            get(get_ticket).put(update_ticket).delete(delete_ticket),
        )
        .route("/api/tickets/{id}/close", post(close_ticket))
        .route("/api/tickets/{id}/similar", get(similar_tickets))
        .route("/api/tickets/{id}/recommendation", get(recommend_handling))
        .route("/api/ai/tags", post(generate_tags))
        .route("/api/ai/reindex", post(reindex_embeddings))
        .with_state(state)
}

pub async fn start() -> Result<(), Box<dyn Error>> {
    let host_url = env::var("API_ADDRESS").expect("API_ADDRESS must be set in environment");
    let mongo_url =
        env::var("MONGODB_URL").unwrap_or_else(|_| "mongodb://localhost:27017".into());
    let db_name = env::var("DATABASE_NAME").unwrap_or_else(|_| "ticket_system".into());

    let client = mongodb::Client::with_uri_str(&mongo_url).await?;
    let repo: Arc<dyn TicketRepository> =
        Arc::new(MongoTicketStore::new(client.database(&db_name)));
    let ai = Arc::new(AiService::from_env(repo.clone()));

    let state = Arc::new(AppState { repo, ai });
    let app = router(state);

    // Bind to address
    let listener = tokio::net::TcpListener::bind(&host_url).await?;
    info!("listening on {host_url}");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
}
