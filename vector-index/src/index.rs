//! Collection lifecycle and point I/O using the modern `qdrant_client` API.

use qdrant_client::qdrant::{
    CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, PointStruct, PointsIdsList,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{DistanceKind, IndexConfig};
use crate::errors::IndexError;

/// Deterministic UUIDv5 point id from an external ticket identifier.
///
/// Ticket ids (`AS-20250101-01`) are not valid Qdrant point ids, so every
/// write and delete goes through this mapping. Determinism is what makes
/// upsert idempotent: the same ticket always lands on the same point.
pub fn stable_point_id(ticket_id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, ticket_id.as_bytes())
}

/// One nearest-neighbour hit: external ticket id plus cosine score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTicket {
    pub ticket_id: String,
    pub score: f32,
}

/// Qdrant-backed index of ticket embeddings.
///
/// The gRPC client is built eagerly (no network I/O); the collection is
/// checked/created on first use and remembered for the process lifetime.
/// Long-lived: construct once and share behind an `Arc`.
pub struct TicketVectorIndex {
    client: Qdrant,
    cfg: IndexConfig,
    ready: OnceCell<()>,
}

impl TicketVectorIndex {
    /// Creates the index handle from the given configuration.
    ///
    /// # Errors
    /// Returns [`IndexError::Config`] on invalid config and
    /// [`IndexError::Qdrant`] if the client cannot be constructed.
    pub fn new(cfg: IndexConfig) -> Result<Self, IndexError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.url);
        if let Some(key) = &cfg.api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| IndexError::Qdrant(format!("client build: {e}")))?;

        Ok(Self {
            client,
            cfg,
            ready: OnceCell::new(),
        })
    }

    /// Inserts or replaces the embedding for `ticket_id`.
    ///
    /// Uses Qdrant's native point upsert keyed by [`stable_point_id`], so
    /// there is exactly one live entry per ticket regardless of how often
    /// (or how concurrently) this is called. `wait(true)` blocks until the
    /// write is durable.
    ///
    /// # Errors
    /// - [`IndexError::VectorSizeMismatch`] if the vector has the wrong
    ///   dimensionality
    /// - [`IndexError::Qdrant`] on transport/server errors
    pub async fn upsert(&self, ticket_id: &str, vector: Vec<f32>) -> Result<(), IndexError> {
        if vector.len() != self.cfg.dim {
            return Err(IndexError::VectorSizeMismatch {
                got: vector.len(),
                want: self.cfg.dim,
            });
        }
        self.ensure_ready().await?;

        let payload: Payload = json!({ "ticket_id": ticket_id })
            .try_into()
            .map_err(|e| IndexError::Qdrant(format!("payload convert: {e}")))?;

        let point = PointStruct::new(stable_point_id(ticket_id).to_string(), vector, payload);

        self.client
            .upsert_points(
                UpsertPointsBuilder::new(&self.cfg.collection, vec![point]).wait(true),
            )
            .await
            .map_err(|e| IndexError::Qdrant(format!("upsert_points: {e}")))?;

        debug!(ticket_id, collection = %self.cfg.collection, "embedding upserted");
        Ok(())
    }

    /// Runs k-NN search for a query vector and returns up to `top_k`
    /// `(ticket id, score)` pairs ordered by descending similarity.
    ///
    /// `filter` is an optional server-side predicate; the current callers
    /// filter against the record store after the fact instead.
    ///
    /// # Errors
    /// - [`IndexError::VectorSizeMismatch`] on query dimensionality mismatch
    /// - [`IndexError::Qdrant`] on transport/server errors
    pub async fn search(
        &self,
        vector: Vec<f32>,
        top_k: usize,
        filter: Option<Filter>,
    ) -> Result<Vec<ScoredTicket>, IndexError> {
        if vector.len() != self.cfg.dim {
            return Err(IndexError::VectorSizeMismatch {
                got: vector.len(),
                want: self.cfg.dim,
            });
        }
        self.ensure_ready().await?;

        let mut builder = SearchPointsBuilder::new(&self.cfg.collection, vector, top_k as u64)
            .with_payload(true);
        if let Some(f) = filter {
            builder = builder.filter(f);
        }

        let resp = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| IndexError::Qdrant(format!("search_points: {e}")))?;

        let hits = resp
            .result
            .into_iter()
            .filter_map(map_scored_point)
            .collect::<Vec<_>>();

        debug!(hits = hits.len(), collection = %self.cfg.collection, "search completed");
        Ok(hits)
    }

    /// Removes the entry for `ticket_id`.
    ///
    /// Deleting an id that was never indexed is not an error.
    ///
    /// # Errors
    /// Returns [`IndexError::Qdrant`] on transport/server errors.
    pub async fn delete(&self, ticket_id: &str) -> Result<(), IndexError> {
        self.ensure_ready().await?;

        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.cfg.collection)
                    .points(PointsIdsList {
                        ids: vec![stable_point_id(ticket_id).to_string().into()],
                    })
                    .wait(true),
            )
            .await
            .map_err(|e| IndexError::Qdrant(format!("delete_points: {e}")))?;

        debug!(ticket_id, collection = %self.cfg.collection, "embedding deleted");
        Ok(())
    }

    /* --------------------- Internals --------------------- */

    /// Checks/creates the collection on first use and remembers the result.
    async fn ensure_ready(&self) -> Result<(), IndexError> {
        self.ready
            .get_or_try_init(|| self.ensure_collection())
            .await?;
        Ok(())
    }

    async fn ensure_collection(&self) -> Result<(), IndexError> {
        info!(
            "Ensuring collection '{}' with dim={} distance={:?}",
            self.cfg.collection, self.cfg.dim, self.cfg.distance
        );

        match self.client.collection_info(&self.cfg.collection).await {
            Ok(_) => {
                debug!("Collection '{}' already exists", self.cfg.collection);
                return Ok(());
            }
            Err(err) => {
                warn!(
                    "Collection '{}' not found, will be created (error={})",
                    self.cfg.collection, err
                );
            }
        }

        let distance = match self.cfg.distance {
            DistanceKind::Cosine => Distance::Cosine,
            DistanceKind::Dot => Distance::Dot,
            DistanceKind::Euclid => Distance::Euclid,
        };

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.cfg.collection)
                    .vectors_config(VectorParamsBuilder::new(self.cfg.dim as u64, distance)),
            )
            .await
            .map_err(|e| IndexError::Qdrant(format!("create_collection: {e}")))?;

        info!("Collection '{}' created successfully", self.cfg.collection);
        Ok(())
    }
}

/// Maps a `ScoredPoint` to a [`ScoredTicket`], reading the external id from
/// the payload with the point id as fallback.
fn map_scored_point(sp: qdrant_client::qdrant::ScoredPoint) -> Option<ScoredTicket> {
    let from_payload = sp
        .payload
        .get("ticket_id")
        .and_then(|v| v.clone().into_json().as_str().map(|s| s.to_owned()));

    let ticket_id = match from_payload {
        Some(id) if !id.is_empty() => id,
        _ => match sp.id.and_then(|pid| pid.point_id_options) {
            Some(qdrant_client::qdrant::point_id::PointIdOptions::Uuid(s)) => s,
            Some(qdrant_client::qdrant::point_id::PointIdOptions::Num(n)) => n.to_string(),
            None => return None,
        },
    };

    Some(ScoredTicket {
        ticket_id,
        score: sp.score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_id_is_deterministic() {
        let a = stable_point_id("AS-20250101-01");
        let b = stable_point_id("AS-20250101-01");
        assert_eq!(a, b);
    }

    #[test]
    fn point_id_differs_per_ticket() {
        assert_ne!(
            stable_point_id("AS-20250101-01"),
            stable_point_id("AS-20250101-02")
        );
    }
}
