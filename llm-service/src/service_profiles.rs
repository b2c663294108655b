//! Shared LLM service with two active profiles: `generation` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches underlying HTTP clients per config (endpoint+model+key+timeout).

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider, settings},
    error_handler::LlmError,
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// Shared service that manages the two logical LLM profiles used by the
/// ticket backend: **generation** and **embedding**.
///
/// Internally caches provider clients keyed by their configuration to avoid
/// recreating HTTP clients on each call.
pub struct LlmProfiles {
    generation: LlmModelConfig,
    embedding: LlmModelConfig,

    ollama: RwLock<HashMap<ClientKey, Arc<OllamaService>>>,
    openai: RwLock<HashMap<ClientKey, Arc<OpenAiService>>>,
}

impl LlmProfiles {
    /// Creates a new service with explicit profile configs.
    pub fn new(generation: LlmModelConfig, embedding: LlmModelConfig) -> Self {
        Self {
            generation,
            embedding,
            ollama: RwLock::new(HashMap::new()),
            openai: RwLock::new(HashMap::new()),
        }
    }

    /// Builds both profiles from environment variables.
    ///
    /// # Errors
    /// Returns [`LlmError::Config`] when mandatory variables are missing.
    pub fn from_env() -> Result<Self, LlmError> {
        Ok(Self::new(
            settings::config_generation()?,
            settings::config_embedding()?,
        ))
    }

    /// Generates text using the **generation** profile.
    ///
    /// # Errors
    /// Returns [`LlmError`] if generation fails.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        match self.generation.provider {
            LlmProvider::Ollama => {
                let cli = self.get_or_init_ollama(&self.generation).await?;
                cli.generate(prompt).await
            }
            LlmProvider::OpenAi => {
                let cli = self.get_or_init_openai(&self.generation).await?;
                cli.generate(prompt).await
            }
        }
    }

    /// Computes an embedding vector using the **embedding** profile.
    ///
    /// # Errors
    /// Returns [`LlmError`] if embedding fails.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, LlmError> {
        match self.embedding.provider {
            LlmProvider::Ollama => {
                let cli = self.get_or_init_ollama(&self.embedding).await?;
                cli.embeddings(input).await
            }
            LlmProvider::OpenAi => {
                let cli = self.get_or_init_openai(&self.embedding).await?;
                cli.embeddings(input).await
            }
        }
    }

    /// Returns references to the current profiles `(generation, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.generation, &self.embedding)
    }

    /* --------------------- Internals --------------------- */

    async fn get_or_init_ollama(
        &self,
        cfg: &LlmModelConfig,
    ) -> Result<Arc<OllamaService>, LlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.ollama.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.ollama.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        let cli = Arc::new(OllamaService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }

    async fn get_or_init_openai(
        &self,
        cfg: &LlmModelConfig,
    ) -> Result<Arc<OpenAiService>, LlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.openai.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.openai.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        let cli = Arc::new(OpenAiService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }
}

/// Internal cache key to identify unique client configs.
#[derive(Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Option<u64>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout_secs,
        }
    }
}
