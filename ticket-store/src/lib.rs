//! Ticket domain model and persistence.
//!
//! The repository trait is the seam between the HTTP/AI layers and storage:
//! production wires [`MongoTicketStore`], tests wire [`InMemoryTicketStore`].

mod error;
mod memory;
mod models;
mod mongodb_store;
mod repository;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryTicketStore;
pub use models::{
    Category, CreateTicket, HandleType, Priority, Status, SystemSource, Ticket, TicketFilter,
    TicketPage, TicketText, UpdateTicket,
};
pub use mongodb_store::MongoTicketStore;
pub use repository::TicketRepository;
