//! Qdrant vector index for ticket embeddings.
//!
//! Keeps the vector-store concerns isolated and easy to replace:
//! - Connect to Qdrant over gRPC (`qdrant_client::Qdrant`).
//! - Ensure the collection exists lazily, once, with the right dim/metric.
//! - Upsert one `(ticket id, embedding)` point at a time (native upsert by
//!   deterministic point id, so repeated writes leave one live entry).
//! - Top-K cosine search returning `(ticket id, score)` pairs.
//! - Delete by ticket id.
//!
//! This crate does **not** create embeddings — only index I/O.

mod config;
mod errors;
mod index;

pub use config::{DistanceKind, IndexConfig};
pub use errors::IndexError;
pub use index::{ScoredTicket, TicketVectorIndex, stable_point_id};

// Callers build optional server-side predicates with the client's own types.
pub use qdrant_client::qdrant::Filter;
