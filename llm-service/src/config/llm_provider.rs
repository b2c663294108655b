use std::str::FromStr;

use crate::error_handler::ConfigError;

/// Represents the provider (backend) used for LLM inference and embeddings.
///
/// The OpenAI variant covers every OpenAI-compatible HTTP API (the hosted
/// GLM endpoint used in production speaks the same protocol). Ollama is
/// kept for local deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// OpenAI-compatible chat/embeddings API.
    OpenAi,
    /// Local Ollama runtime for on-device inference.
    Ollama,
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "open_ai" | "glm" | "zhipu" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}
