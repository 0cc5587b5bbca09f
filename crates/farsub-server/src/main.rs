//! Subtitle pipeline server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use farsub_config::{load_settings, Settings};
use farsub_llm::{LlmRouter, OpenRouterClient, OpenRouterConfig, RetryPolicy};
use farsub_pipeline::{AssemblyAiAsr, FfmpegNormalizer, StorageLayout};
use farsub_server::{create_router, init_metrics, AppState, JobQueue, WorkerDeps};
use farsub_tm::QdrantTmIndex;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env = std::env::var("FARSUB_ENV").ok();
    let settings = match load_settings(env.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Warning: failed to load config: {e}. Using defaults.");
            Settings::default()
        }
    };

    init_tracing(&settings);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting farsub-server");

    if let Err(e) = settings.validate() {
        tracing::warn!(error = %e, "configuration failed validation, continuing with it anyway");
    }

    let storage = StorageLayout::new(settings.data_dir.clone());
    storage.ensure_top_level_dirs().await?;

    let persistence = {
        let scylla_config = farsub_persistence::ScyllaConfig {
            hosts: settings.persistence.scylla_hosts.clone(),
            keyspace: settings.persistence.keyspace.clone(),
            replication_factor: settings.persistence.replication_factor,
        };
        farsub_persistence::init(scylla_config).await?
    };
    tracing::info!(keyspace = %settings.persistence.keyspace, "persistence layer ready");

    let chat_provider = OpenRouterClient::new(OpenRouterConfig {
        base_url: settings.providers.openrouter_base_url.clone(),
        api_key: settings.providers.openrouter_api_key.clone(),
    })?;
    let router = LlmRouter::new(chat_provider, RetryPolicy::default());

    let embedder: Arc<dyn farsub_core::EmbeddingProvider> = {
        let client = OpenRouterClient::new(OpenRouterConfig {
            base_url: settings.providers.openrouter_base_url.clone(),
            api_key: settings.providers.openrouter_api_key.clone(),
        })?;
        Arc::new(client)
    };

    let vector_index: Arc<dyn farsub_core::VectorIndex> = {
        let index = QdrantTmIndex::connect(
            &settings.embedding.qdrant_url,
            &settings.embedding.qdrant_collection,
            settings.embedding.dim,
        )?;
        index.ensure_collection().await?;
        Arc::new(index)
    };

    let asr: Arc<dyn farsub_core::AsrProvider> =
        Arc::new(AssemblyAiAsr::new(settings.providers.assemblyai_api_key.clone())?);
    let normalizer: Arc<dyn farsub_core::AudioNormalizer> = Arc::new(FfmpegNormalizer::default());

    let worker_deps = Arc::new(WorkerDeps {
        settings: settings.clone(),
        storage: storage.clone(),
        asr,
        router,
        embedder,
        vector_index,
        normalizer,
        persistence: persistence.clone(),
    });
    let queue = Arc::new(JobQueue::spawn(settings.queue.worker_concurrency, worker_deps));
    tracing::info!(
        workers = settings.queue.worker_concurrency,
        "job worker pool started"
    );

    let metrics_handle = init_metrics();

    let state = AppState {
        settings: Arc::new(settings.clone()),
        storage: Arc::new(storage),
        persistence: Arc::new(persistence),
        queue,
        metrics_handle,
    };

    let app = create_router(state);

    let addr = SocketAddr::new(settings.server.host.parse()?, settings.server.port);
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "farsub_server=info,farsub_pipeline=info,tower_http=info".into());

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let json = matches!(
        settings.environment,
        farsub_config::RuntimeEnvironment::Production
    );
    let fmt_layer = if json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}
