//! Bundles every external collaborator and shared config the orchestrator
//! needs, so `run_job` takes one argument instead of eight.

use farsub_config::Settings;
use farsub_core::{AsrProvider, AudioNormalizer, ChatProvider, EmbeddingProvider, VectorIndex};
use farsub_llm::LlmRouter;
use farsub_persistence::PersistenceLayer;

use crate::storage::StorageLayout;

pub struct PipelineDeps<'a, P: ChatProvider> {
    pub settings: &'a Settings,
    pub storage: &'a StorageLayout,
    pub asr: &'a dyn AsrProvider,
    pub router: &'a LlmRouter<P>,
    pub embedder: &'a dyn EmbeddingProvider,
    pub vector_index: &'a dyn VectorIndex,
    pub normalizer: &'a dyn AudioNormalizer,
    pub persistence: &'a PersistenceLayer,
}
