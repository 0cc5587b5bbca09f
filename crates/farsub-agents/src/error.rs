//! Error type for agent calls. Every variant carries the `LlmRun` the router
//! produced so the caller can persist it regardless of whether the agent's
//! output ended up usable — mirrors `farsub_llm::router::FallbackOutcome`'s
//! always-populated-run design one layer up.

use farsub_core::LlmRun;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("{agent} exhausted all fallback models: {source}")]
    Llm {
        agent: String,
        #[source]
        source: farsub_llm::LlmError,
        run: LlmRun,
    },

    #[error("{agent} returned JSON that doesn't parse: {source}")]
    Json {
        agent: String,
        #[source]
        source: serde_json::Error,
        run: LlmRun,
    },

    #[error("{agent} returned JSON that fails its output contract: {detail}")]
    SchemaValidation {
        agent: String,
        detail: String,
        run: LlmRun,
    },
}

impl AgentError {
    /// The run to persist no matter which branch failed.
    pub fn run(&self) -> &LlmRun {
        match self {
            AgentError::Llm { run, .. } => run,
            AgentError::Json { run, .. } => run,
            AgentError::SchemaValidation { run, .. } => run,
        }
    }
}

impl From<AgentError> for farsub_core::Error {
    fn from(err: AgentError) -> Self {
        farsub_core::Error::Llm(err.to_string())
    }
}
