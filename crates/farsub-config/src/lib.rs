//! Layered configuration for the subtitle pipeline.
//!
//! Loads from `config/default.toml`, an optional `config/{env}.toml`, then
//! `FARSUB__`-prefixed environment variables, in that priority order
//! (environment wins). Every field carries a literal default so the crate
//! works unconfigured in development.

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, BatchingConfig, EmbeddingConfig, ModelRoutingConfig, ModelSlot,
    PersistenceConfig, ProviderConfig, QueueConfig, RuntimeEnvironment, ServerConfig, Settings,
    SubtitleShapeConfig, TmThresholdConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for farsub_core::Error {
    fn from(err: ConfigError) -> Self {
        farsub_core::Error::Invariant(err.to_string())
    }
}
