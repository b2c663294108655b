//! Timeout budgets and knobs for the AI pipeline.

use std::time::Duration;

/// Per-call budgets for the external providers.
///
/// `generation_buffer` is added on top of `generation_timeout` for the
/// outer await, so the HTTP client's own deadline always fires first and
/// the buffer only absorbs network overhead.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Budget for one embedding request.
    pub embedding_timeout: Duration,
    /// Budget for one vector index round trip.
    pub vector_timeout: Duration,
    /// Budget for one generation request (mirrors the provider timeout).
    pub generation_timeout: Duration,
    /// Extra slack for the outer generation await.
    pub generation_buffer: Duration,
    /// Concurrent embedding requests during bulk reindex.
    pub reindex_concurrency: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            embedding_timeout: Duration::from_secs(30),
            vector_timeout: Duration::from_secs(60),
            generation_timeout: Duration::from_secs(60),
            generation_buffer: Duration::from_secs(5),
            reindex_concurrency: 4,
        }
    }
}

impl AiConfig {
    /// Builds the config from environment variables, falling back to the
    /// defaults above for anything unset.
    ///
    /// - `EMBEDDING_TIMEOUT_SECS`
    /// - `VECTOR_TIMEOUT_SECS`
    /// - `LLM_TIMEOUT_SECS`
    /// - `REINDEX_CONCURRENCY`
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(v) = env_u64("EMBEDDING_TIMEOUT_SECS") {
            cfg.embedding_timeout = Duration::from_secs(v);
        }
        if let Some(v) = env_u64("VECTOR_TIMEOUT_SECS") {
            cfg.vector_timeout = Duration::from_secs(v);
        }
        if let Some(v) = env_u64("LLM_TIMEOUT_SECS") {
            cfg.generation_timeout = Duration::from_secs(v);
        }
        if let Some(v) = env_u64("REINDEX_CONCURRENCY") {
            cfg.reindex_concurrency = (v as usize).max(1);
        }
        cfg
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|s| s.parse::<u64>().ok())
}
