//! In-process job worker pool. `POST /jobs` enqueues a job id; a fixed
//! number of background tasks pull from the shared queue and drive each job
//! to completion via `farsub_pipeline::run_job`. Grounded on the teacher's
//! `SessionManager::start_cleanup_task` shape (`tokio::spawn` off an `Arc`,
//! `tracing::info!` around lifecycle events), generalized from one periodic
//! task to a fixed pool of consumers.

use std::sync::Arc;

use farsub_llm::LlmRouter;
use farsub_persistence::JobStore;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::metrics::{record_job_failed, record_job_succeeded};
use crate::state::Provider;

pub struct JobQueue {
    sender: mpsc::Sender<Uuid>,
}

impl JobQueue {
    /// Spawns `worker_count` consumers sharing one channel, each looping
    /// `run_job` until the job reaches a terminal status or a stage fails.
    /// A failed job simply stays at its failing stage in Scylla; nothing
    /// here retries it automatically. (Operators re-enqueue by job id.)
    pub fn spawn(worker_count: usize, deps: Arc<WorkerDeps>) -> Self {
        let (sender, receiver) = mpsc::channel(1024);
        let receiver = Arc::new(Mutex::new(receiver));

        for worker_id in 0..worker_count.max(1) {
            let receiver = Arc::clone(&receiver);
            let deps = Arc::clone(&deps);
            tokio::spawn(async move {
                tracing::info!(worker_id, "job worker started");
                loop {
                    let job_id = {
                        let mut rx = receiver.lock().await;
                        rx.recv().await
                    };
                    let Some(job_id) = job_id else {
                        tracing::info!(worker_id, "job queue closed, worker exiting");
                        break;
                    };
                    run_one(worker_id, &deps, job_id).await;
                }
            });
        }

        Self { sender }
    }

    pub async fn enqueue(&self, job_id: Uuid) -> Result<(), mpsc::error::SendError<Uuid>> {
        self.sender.send(job_id).await
    }
}

/// Owned collaborators the worker needs, separate from `AppState` so the
/// HTTP layer doesn't have to know the pipeline's dependency shape.
pub struct WorkerDeps {
    pub settings: farsub_config::Settings,
    pub storage: farsub_pipeline::StorageLayout,
    pub asr: Arc<dyn farsub_core::AsrProvider>,
    pub router: LlmRouter<Provider>,
    pub embedder: Arc<dyn farsub_core::EmbeddingProvider>,
    pub vector_index: Arc<dyn farsub_core::VectorIndex>,
    pub normalizer: Arc<dyn farsub_core::AudioNormalizer>,
    pub persistence: farsub_persistence::PersistenceLayer,
}

async fn run_one(worker_id: usize, deps: &WorkerDeps, job_id: Uuid) {
    let started = std::time::Instant::now();
    let pipeline_deps = farsub_pipeline::PipelineDeps {
        settings: &deps.settings,
        storage: &deps.storage,
        asr: deps.asr.as_ref(),
        router: &deps.router,
        embedder: deps.embedder.as_ref(),
        vector_index: deps.vector_index.as_ref(),
        normalizer: deps.normalizer.as_ref(),
        persistence: &deps.persistence,
    };

    match farsub_pipeline::run_job(&pipeline_deps, job_id).await {
        Ok(()) => {
            record_job_succeeded(started.elapsed());
            tracing::info!(worker_id, job_id = %job_id, "job finished");
        }
        Err(e) => {
            record_job_failed(started.elapsed());
            let stage = deps
                .persistence
                .jobs
                .get(job_id)
                .await
                .ok()
                .flatten()
                .map(|j| j.status);
            tracing::error!(worker_id, job_id = %job_id, stage = ?stage, error = %e, "job failed");
        }
    }
}
