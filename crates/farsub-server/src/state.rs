//! Shared application state handed to every axum handler.

use std::sync::Arc;

use farsub_config::Settings;
use farsub_llm::OpenRouterClient;
use farsub_persistence::PersistenceLayer;
use farsub_pipeline::StorageLayout;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::worker::JobQueue;

/// The one `ChatProvider`/`EmbeddingProvider` this server wires up in
/// production. Kept as a type alias rather than a generic `AppState<P>` so
/// handlers stay concrete, matching the teacher's non-generic `AppState`.
pub type Provider = OpenRouterClient;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub storage: Arc<StorageLayout>,
    pub persistence: Arc<PersistenceLayer>,
    pub queue: Arc<JobQueue>,
    pub metrics_handle: PrometheusHandle,
}
