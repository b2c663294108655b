//! Runtime and collection configuration.

use crate::errors::IndexError;

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug)]
pub enum DistanceKind {
    /// Cosine distance (recommended for most embeddings).
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2).
    Euclid,
}

/// Configuration for the ticket embedding index.
#[derive(Clone, Debug)]
pub struct IndexConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub url: String,
    /// Optional API key for Qdrant Cloud.
    pub api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Dimensionality of stored vectors.
    pub dim: usize,
    /// Distance function (Cosine by default).
    pub distance: DistanceKind,
}

impl IndexConfig {
    /// Creates a sane default config for a given Qdrant endpoint.
    pub fn new_default(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            collection: "ticket_embeddings".into(),
            dim: 1024,
            distance: DistanceKind::Cosine,
        }
    }

    /// Builds the config from environment variables.
    ///
    /// - `QDRANT_URL` (required)
    /// - `QDRANT_API_KEY` (optional)
    /// - `QDRANT_COLLECTION` (default `ticket_embeddings`)
    /// - `EMBEDDING_DIM` (default 1024)
    ///
    /// # Errors
    /// Returns [`IndexError::Config`] when `QDRANT_URL` is missing or
    /// `EMBEDDING_DIM` is not a number.
    pub fn from_env() -> Result<Self, IndexError> {
        let url = std::env::var("QDRANT_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| IndexError::Config("QDRANT_URL is not set".into()))?;

        let mut cfg = Self::new_default(url);

        cfg.api_key = std::env::var("QDRANT_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty());

        if let Ok(name) = std::env::var("QDRANT_COLLECTION") {
            if !name.trim().is_empty() {
                cfg.collection = name;
            }
        }

        if let Ok(dim) = std::env::var("EMBEDDING_DIM") {
            if !dim.trim().is_empty() {
                cfg.dim = dim
                    .parse::<usize>()
                    .map_err(|_| IndexError::Config("EMBEDDING_DIM must be a number".into()))?;
            }
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.url.trim().is_empty() {
            return Err(IndexError::Config("url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(IndexError::Config("collection is empty".into()));
        }
        if self.dim == 0 {
            return Err(IndexError::Config("dim must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = IndexConfig::new_default("http://localhost:6334");
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.collection, "ticket_embeddings");
        assert_eq!(cfg.dim, 1024);
    }

    #[test]
    fn empty_collection_is_rejected() {
        let mut cfg = IndexConfig::new_default("http://localhost:6334");
        cfg.collection = " ".into();
        assert!(cfg.validate().is_err());
    }
}
