//! Error type for the ScyllaDB persistence layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("invalid row data: {0}")]
    InvalidData(String),

    #[error("not found")]
    NotFound,
}

impl From<PersistenceError> for farsub_core::Error {
    fn from(err: PersistenceError) -> Self {
        farsub_core::Error::Persistence(err.to_string())
    }
}
