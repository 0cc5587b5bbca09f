//! Thin HTTP surface: upload, status, download, health, metrics.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Multipart, Path, Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use farsub_core::Job;
use farsub_persistence::JobStore;

use crate::error::ServerError;
use crate::metrics::record_job_enqueued;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.settings.server.cors_origins);
    let request_timeout = Duration::from_secs(state.settings.server.request_timeout_secs);

    Router::new()
        .route("/jobs", post(create_job))
        .route("/jobs/:id", get(get_job))
        .route("/jobs/:id/download/:kind", get(download))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(move |req: Request, next: Next| {
            timeout_middleware(req, next, request_timeout)
        }))
        .layer(cors)
        .with_state(state)
}

/// Bounds how long a single request may run. Implemented as `from_fn` rather
/// than `tower::timeout::TimeoutLayer` so the layer's error type stays
/// `Infallible`, which is what `Router::layer` requires.
async fn timeout_middleware(req: Request, next: Next, duration: Duration) -> Response {
    match tokio::time::timeout(duration, next.run(req)).await {
        Ok(response) => response,
        Err(_) => StatusCode::REQUEST_TIMEOUT.into_response(),
    }
}

/// Mirrors the teacher's CORS wiring: explicit origins when configured,
/// permissive only as the unconfigured-dev-server fallback.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST]);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| {
            o.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!(origin = %o, "invalid CORS origin, skipping");
                None
            })
        })
        .collect();

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST])
}

async fn create_job(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ServerError> {
    let mut filename: Option<String> = None;
    let mut bytes: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::InvalidUpload(e.to_string()))?
    {
        if field.name() == Some("file") {
            filename = field.file_name().map(str::to_string);
            bytes = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::InvalidUpload(e.to_string()))?,
            );
        }
    }

    let filename = filename.ok_or_else(|| ServerError::InvalidUpload("missing file field".to_string()))?;
    let bytes = bytes.ok_or_else(|| ServerError::InvalidUpload("missing file contents".to_string()))?;

    let job_id = Uuid::new_v4();
    let upload_path = state.storage.upload_path(job_id, &filename);
    if let Some(parent) = std::path::Path::new(&upload_path).parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;
    }
    tokio::fs::write(&upload_path, &bytes)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    let job = Job::new(job_id, upload_path, chrono::Utc::now());
    state.persistence.jobs.create(&job).await?;

    state
        .queue
        .enqueue(job_id)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    record_job_enqueued();

    Ok(Json(serde_json::json!({
        "job_id": job_id,
        "status": "UPLOADED",
    })))
}

#[derive(Serialize)]
struct JobView {
    job_id: Uuid,
    status: String,
    risk_level: Option<String>,
    difficulty_score: Option<u8>,
    strategist_conf: Option<u8>,
    genre: Option<String>,
    tone: Option<String>,
    domain_tags: Vec<String>,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.job_id,
            status: format!("{:?}", job.status).to_uppercase(),
            risk_level: job.risk_level.map(|r| format!("{r:?}").to_uppercase()),
            difficulty_score: job.difficulty_score,
            strategist_conf: job.strategist_confidence,
            genre: job.genre,
            tone: job.tone,
            domain_tags: job.domain_tags,
        }
    }
}

async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobView>, ServerError> {
    let job = state
        .persistence
        .jobs
        .get(id)
        .await?
        .ok_or(ServerError::JobNotFound(id))?;
    Ok(Json(job.into()))
}

async fn download(
    State(state): State<AppState>,
    Path((id, kind)): Path<(Uuid, String)>,
) -> Result<Response, ServerError> {
    let (path, content_type) = match kind.as_str() {
        "en_srt" => (state.storage.en_srt_path(id), "application/x-subrip"),
        "fa_srt" => (state.storage.fa_srt_path(id), "application/x-subrip"),
        "qa_report" => (state.storage.qa_report_path(id), "application/json"),
        "librarian" => (state.storage.librarian_report_path(id), "application/json"),
        other => return Err(ServerError::UnknownDownloadKind(other.to_string())),
    };

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ServerError::ArtifactNotReady)?;

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_rejects_unknown_kind() {
        let kind = "video";
        let result: Result<(String, &str), ServerError> = match kind {
            "en_srt" => Ok(("x".to_string(), "application/x-subrip")),
            other => Err(ServerError::UnknownDownloadKind(other.to_string())),
        };
        assert!(matches!(result, Err(ServerError::UnknownDownloadKind(_))));
    }
}
