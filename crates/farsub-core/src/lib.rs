//! Domain types, error types and provider traits shared across the subtitle
//! pipeline crates.
//!
//! This crate has no I/O of its own: it defines the entities from the data
//! model (`Job`, `JobCue`, `JobGlossaryTerm`, `TMEntry`, `LLMRun`), the stage
//! enum the orchestrator advances through, and the trait boundaries for the
//! external collaborators (ASR, LLM chat/embeddings, vector index) that every
//! other crate in the workspace is written against.

pub mod domain;
pub mod error;
pub mod providers;

pub use domain::{
    CueIssues, DomainTags, Job, JobCue, JobGlossaryTerm, JobStatus, LlmRun, LlmRunStatus,
    QualityGrade, RiskLevel, TermType, TmEntry,
};
pub use error::{Error, Result};
pub use providers::{
    AsrProvider, AsrTranscript, AsrWord, AudioNormalizer, ChatMessage, ChatProvider, ChatRole,
    ChatUsage, EmbeddingProvider, VectorHit, VectorIndex,
};
