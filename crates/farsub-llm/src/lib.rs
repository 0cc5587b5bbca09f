//! LLM chat/embedding backend with retry, backoff and multi-model fallback.
//!
//! `openrouter` implements `farsub_core::{ChatProvider, EmbeddingProvider}`
//! against an OpenRouter-compatible HTTP API. `router` wraps any
//! `ChatProvider` with the retry-then-fall-through-models policy every agent
//! call goes through (§4.5).

pub mod openrouter;
pub mod router;
pub mod tokens;

pub use openrouter::{OpenRouterClient, OpenRouterConfig};
pub use router::{FallbackOutcome, LlmRouter, RetryPolicy};
pub use tokens::estimate_tokens;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("generation error: {0}")]
    Generation(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("request timed out")]
    Timeout,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("all models exhausted for agent {agent_name}: {last_error}")]
    ModelsExhausted {
        agent_name: String,
        last_error: String,
    },
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for farsub_core::Error {
    fn from(err: LlmError) -> Self {
        farsub_core::Error::Llm(err.to_string())
    }
}
