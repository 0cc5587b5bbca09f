//! Workspace-wide error type.
//!
//! Library crates define their own `thiserror` enums for the failures local
//! to them (`farsub_llm::LlmError`, `farsub_tm::TmError`, ...) and convert
//! into this type at crate boundaries, mirroring how the teacher codebase's
//! `LlmError` converts into its own core error.

use thiserror::Error;

use crate::domain::JobStatus;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("input error: {0}")]
    Input(String),

    #[error("ASR provider error: {0}")]
    Asr(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("translation memory error: {0}")]
    Tm(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("stage {stage:?} failed: {source}")]
    Stage {
        stage: JobStatus,
        #[source]
        source: Box<Error>,
    },
}
