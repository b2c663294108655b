use std::sync::Arc;

use ticket_ai::AiService;
use ticket_store::TicketRepository;

/// Shared state for all HTTP handlers.
///
/// Both fields are long-lived singletons constructed at startup; the AI
/// service internally degrades to no-ops when its providers are not
/// configured, so handlers never need to special-case that.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn TicketRepository>,
    pub ai: Arc<AiService>,
}
