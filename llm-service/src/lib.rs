//! Shared LLM service used by the ticket backend.
//!
//! Two logical profiles are exposed: **generation** (handling
//! recommendations, tag suggestions) and **embedding** (vector search).
//! Both are backed by either an OpenAI-compatible HTTP API or a local
//! Ollama runtime, selected via configuration.

pub mod config;
pub mod error_handler;
pub mod service_profiles;
pub mod services;

pub use config::llm_model_config::LlmModelConfig;
pub use config::llm_provider::LlmProvider;
pub use error_handler::LlmError;
pub use service_profiles::LlmProfiles;
