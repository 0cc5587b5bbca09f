//! Error type for the stage machine. Every variant wraps the originating
//! subsystem's error; the orchestrator never loses the stage it was running
//! in, since the caller attaches that context when it logs or propagates.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] farsub_core::Error),

    #[error(transparent)]
    Agent(#[from] farsub_agents::AgentError),

    #[error(transparent)]
    Tm(#[from] farsub_tm::TmError),

    #[error(transparent)]
    Persistence(#[from] farsub_persistence::PersistenceError),

    #[error("report serialization failed: {0}")]
    Report(#[from] serde_json::Error),

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("job {0} not found")]
    JobNotFound(uuid::Uuid),
}

impl From<PipelineError> for farsub_core::Error {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Core(e) => e,
            other => farsub_core::Error::Invariant(other.to_string()),
        }
    }
}
