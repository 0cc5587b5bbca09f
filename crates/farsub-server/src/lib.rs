//! HTTP upload/status/download surface plus the in-process worker pool that
//! drives jobs through `farsub-pipeline`.

pub mod error;
pub mod http;
pub mod metrics;
pub mod state;
pub mod worker;

pub use error::ServerError;
pub use http::create_router;
pub use metrics::init_metrics;
pub use state::AppState;
pub use worker::{JobQueue, WorkerDeps};
