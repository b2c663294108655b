use crate::config::llm_provider::LlmProvider;

/// Configuration for a single LLM model invocation profile.
///
/// The same struct serves both generation and embedding profiles; fields
/// that do not apply to a profile (e.g. `temperature` for embeddings) are
/// simply left `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// The LLM provider/backend.
    pub provider: LlmProvider,

    /// Model identifier string (e.g. `"glm-4-flash"`, `"embedding-3"`).
    pub model: String,

    /// Inference endpoint base URL.
    pub endpoint: String,

    /// Optional API key for authentication.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Requested embedding dimensionality (embedding profile only).
    pub dimensions: Option<usize>,

    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
}
