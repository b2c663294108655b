//! Profile configs loaded strictly from environment variables.
//!
//! Two roles are built here:
//!
//! - **Generation** → handling recommendations and tag suggestions
//! - **Embedding**  → vectors for similarity search
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_PROVIDER` = provider kind (`openai` (default) or `ollama`)
//! - `LLM_ENDPOINT` = API base URL (mandatory)
//! - `LLM_API_KEY`  = API key (mandatory for the OpenAI-compatible provider)
//!
//! Generation:
//! - `LLM_MODEL`        = chat model (default `glm-4-flash`)
//! - `LLM_MAX_TOKENS`   = optional max tokens (default 1000)
//! - `LLM_TIMEOUT_SECS` = per-request timeout (default 60)
//!
//! Embedding:
//! - `EMBEDDING_MODEL`        = embedding model (default `embedding-3`)
//! - `EMBEDDING_DIM`          = vector dimensionality (default 1024)
//! - `EMBEDDING_TIMEOUT_SECS` = per-request timeout (default 30)

use std::str::FromStr;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{LlmError, env_opt_u32, env_opt_u64, env_opt_usize, must_env},
};

fn provider_from_env() -> Result<LlmProvider, LlmError> {
    match std::env::var("LLM_PROVIDER") {
        Ok(v) if !v.trim().is_empty() => LlmProvider::from_str(&v).map_err(Into::into),
        _ => Ok(LlmProvider::OpenAi),
    }
}

fn api_key_from_env(provider: LlmProvider) -> Result<Option<String>, LlmError> {
    match provider {
        // Ollama runs unauthenticated.
        LlmProvider::Ollama => Ok(None),
        LlmProvider::OpenAi => must_env("LLM_API_KEY").map(Some),
    }
}

/// Constructs the **generation** profile config.
///
/// # Errors
/// Returns [`LlmError::Config`] when mandatory variables are missing or
/// malformed.
pub fn config_generation() -> Result<LlmModelConfig, LlmError> {
    let provider = provider_from_env()?;
    let endpoint = must_env("LLM_ENDPOINT")?;
    let api_key = api_key_from_env(provider)?;
    let model =
        std::env::var("LLM_MODEL").unwrap_or_else(|_| "glm-4-flash".into());
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?.or(Some(1000));
    let timeout_secs = env_opt_u64("LLM_TIMEOUT_SECS")?.or(Some(60));

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens,
        temperature: Some(0.7),
        top_p: None,
        dimensions: None,
        timeout_secs,
    })
}

/// Constructs the **embedding** profile config.
///
/// # Errors
/// Returns [`LlmError::Config`] when mandatory variables are missing or
/// malformed.
pub fn config_embedding() -> Result<LlmModelConfig, LlmError> {
    let provider = provider_from_env()?;
    let endpoint = must_env("LLM_ENDPOINT")?;
    let api_key = api_key_from_env(provider)?;
    let model =
        std::env::var("EMBEDDING_MODEL").unwrap_or_else(|_| "embedding-3".into());
    let dimensions = env_opt_usize("EMBEDDING_DIM")?.or(Some(1024));
    let timeout_secs = env_opt_u64("EMBEDDING_TIMEOUT_SECS")?.or(Some(30));

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens: None,
        temperature: None,
        top_p: None,
        dimensions,
        timeout_secs,
    })
}
