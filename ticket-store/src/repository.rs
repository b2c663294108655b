use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{CreateTicket, Ticket, TicketFilter, TicketPage, TicketText, UpdateTicket};

/// Data access interface for tickets.
///
/// Implementations can use different storage backends; the similarity
/// subsystem only ever sees this trait, so tests substitute an in-memory
/// fake without touching process state.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Create a new ticket with a freshly generated `AS-YYYYMMDD-NN` id.
    async fn create(&self, input: CreateTicket) -> StoreResult<Ticket>;

    /// Fetch a ticket by its external id.
    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Ticket>>;

    /// List tickets matching the filter, newest first, paginated.
    async fn list(&self, filter: TicketFilter) -> StoreResult<TicketPage>;

    /// Apply a partial update; returns `None` if the id is unknown.
    async fn update(&self, id: &str, input: UpdateTicket) -> StoreResult<Option<Ticket>>;

    /// Mark a ticket completed and stamp `closed_at`.
    async fn close(&self, id: &str) -> StoreResult<Option<Ticket>>;

    /// Delete a ticket; `Ok(false)` if the id is unknown.
    async fn delete(&self, id: &str) -> StoreResult<bool>;

    /// The eligibility join used by similarity search: among `ids`, return
    /// completed tickets whose resolution detail is non-empty, capped at
    /// `limit`.
    async fn find_resolved_in(&self, ids: &[String], limit: usize) -> StoreResult<Vec<Ticket>>;

    /// Id/description pairs for every ticket (bulk reindex scan).
    async fn all_descriptions(&self) -> StoreResult<Vec<TicketText>>;
}
