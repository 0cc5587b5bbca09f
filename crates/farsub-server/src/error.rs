//! HTTP-facing error type. Wraps the lower crates' errors and maps each to
//! the status code the handler should return.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("job {0} not found")]
    JobNotFound(uuid::Uuid),

    #[error("unknown download kind: {0}")]
    UnknownDownloadKind(String),

    #[error("artifact not ready yet")]
    ArtifactNotReady,

    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] farsub_pipeline::PipelineError),

    #[error("persistence error: {0}")]
    Persistence(#[from] farsub_persistence::PersistenceError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::JobNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::UnknownDownloadKind(_) => StatusCode::BAD_REQUEST,
            ServerError::ArtifactNotReady => StatusCode::NOT_FOUND,
            ServerError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
