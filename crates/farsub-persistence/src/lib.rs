//! ScyllaDB persistence layer for the subtitle pipeline.
//!
//! Provides stores for:
//! - `Job`
//! - `JobCue`
//! - `JobGlossaryTerm`
//! - `TmEntry` (metadata only; the embedding lives in Qdrant, see `farsub_tm`)
//! - `LlmRun`

mod codec;

pub mod client;
pub mod cues;
pub mod error;
pub mod glossary;
pub mod jobs;
pub mod llm_runs;
pub mod schema;
pub mod tm_entries;

pub use client::{ScyllaClient, ScyllaConfig};
pub use cues::{JobCueStore, ScyllaJobCueStore};
pub use error::PersistenceError;
pub use glossary::{JobGlossaryStore, ScyllaJobGlossaryStore};
pub use jobs::{JobStore, ScyllaJobStore};
pub use llm_runs::{LlmRunStore, ScyllaLlmRunStore};
pub use tm_entries::{ScyllaTmEntryStore, TmEntryStore};

/// Connects to ScyllaDB, ensures the schema exists, and wires up every
/// store. Call once at startup and share the result behind an `Arc`.
pub async fn init(config: ScyllaConfig) -> Result<PersistenceLayer, PersistenceError> {
    let client = ScyllaClient::connect(config).await?;
    client.ensure_schema().await?;

    Ok(PersistenceLayer {
        jobs: ScyllaJobStore::new(client.clone()),
        cues: ScyllaJobCueStore::new(client.clone()),
        glossary: ScyllaJobGlossaryStore::new(client.clone()),
        tm_entries: ScyllaTmEntryStore::new(client.clone()),
        llm_runs: ScyllaLlmRunStore::new(client),
    })
}

/// Combined persistence layer with every store, handed to `farsub-pipeline`
/// and `farsub-server` as a single dependency.
#[derive(Clone)]
pub struct PersistenceLayer {
    pub jobs: ScyllaJobStore,
    pub cues: ScyllaJobCueStore,
    pub glossary: ScyllaJobGlossaryStore,
    pub tm_entries: ScyllaTmEntryStore,
    pub llm_runs: ScyllaLlmRunStore,
}
