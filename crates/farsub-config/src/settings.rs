//! Main settings module.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{endpoints, models};
use crate::ConfigError;

/// Runtime environment. Controls how strictly `Settings::validate` treats
/// missing provider credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Top-level settings, assembled from `config/default.toml`,
/// `config/{env}.toml` and `FARSUB__`-prefixed environment variables, highest
/// priority last.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default)]
    pub providers: ProviderConfig,

    #[serde(default)]
    pub subtitle: SubtitleShapeConfig,

    #[serde(default)]
    pub batching: BatchingConfig,

    #[serde(default)]
    pub tm: TmThresholdConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub models: ModelRoutingConfig,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    #[serde(default)]
    pub queue: QueueConfig,
}

fn default_data_dir() -> String {
    "/data".to_string()
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_subtitle_shape()?;
        self.validate_tm_thresholds()?;
        self.validate_server()?;
        self.validate_providers()?;
        Ok(())
    }

    fn validate_subtitle_shape(&self) -> Result<(), ConfigError> {
        let s = &self.subtitle;
        if s.max_lines == 0 {
            return Err(ConfigError::InvalidValue {
                field: "subtitle.max_lines".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if s.max_chars_per_line == 0 {
            return Err(ConfigError::InvalidValue {
                field: "subtitle.max_chars_per_line".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if s.target_cps <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "subtitle.target_cps".to_string(),
                message: format!("must be positive, got {}", s.target_cps),
            });
        }
        if s.min_cue_ms <= 0 || s.max_cue_ms <= s.min_cue_ms {
            return Err(ConfigError::InvalidValue {
                field: "subtitle.min_cue_ms / max_cue_ms".to_string(),
                message: format!(
                    "require 0 < min_cue_ms({}) < max_cue_ms({})",
                    s.min_cue_ms, s.max_cue_ms
                ),
            });
        }
        Ok(())
    }

    fn validate_tm_thresholds(&self) -> Result<(), ConfigError> {
        let t = &self.tm;
        if !(0.0..=1.0).contains(&t.auto_reuse_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "tm.auto_reuse_threshold".to_string(),
                message: format!("must be in [0,1], got {}", t.auto_reuse_threshold),
            });
        }
        if !(0.0..=1.0).contains(&t.judge_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "tm.judge_threshold".to_string(),
                message: format!("must be in [0,1], got {}", t.judge_threshold),
            });
        }
        if t.judge_threshold > t.auto_reuse_threshold {
            return Err(ConfigError::InvalidValue {
                field: "tm.judge_threshold".to_string(),
                message: format!(
                    "judge_threshold ({}) cannot exceed auto_reuse_threshold ({})",
                    t.judge_threshold, t.auto_reuse_threshold
                ),
            });
        }
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "port cannot be 0".to_string(),
            });
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.max_upload_bytes".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// In production/staging, provider API keys must actually be set: a
    /// missing key only produces a warning in development, where most of
    /// the pipeline runs against a fake provider anyway.
    fn validate_providers(&self) -> Result<(), ConfigError> {
        let missing: Vec<&str> = [
            ("providers.assemblyai_api_key", &self.providers.assemblyai_api_key),
            ("providers.openrouter_api_key", &self.providers.openrouter_api_key),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            return Ok(());
        }

        if self.environment.is_strict() {
            return Err(ConfigError::MissingField(missing.join(", ")));
        }

        tracing::warn!(missing = %missing.join(", "), "provider API key(s) not configured");
        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Max multipart upload body size accepted by `POST /jobs`.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_max_upload_bytes() -> usize {
    2 * 1024 * 1024 * 1024 // 2 GiB, generous for source video/audio
}
fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            request_timeout_secs: default_request_timeout_secs(),
            cors_origins: Vec::new(),
        }
    }
}

/// Provider credentials. Never logged; `Debug` is derived but values should
/// not be emitted at `info` level or above by callers.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub assemblyai_api_key: String,

    #[serde(default)]
    pub openrouter_api_key: String,

    #[serde(default = "default_openrouter_base_url")]
    pub openrouter_base_url: String,
}

fn default_openrouter_base_url() -> String {
    endpoints::OPENROUTER_DEFAULT.clone()
}

/// Subtitle shape constraints enforced by the segmenter and timeline clamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleShapeConfig {
    #[serde(default = "default_max_lines")]
    pub max_lines: u32,

    #[serde(default = "default_max_chars_per_line")]
    pub max_chars_per_line: u32,

    #[serde(default = "default_target_cps")]
    pub target_cps: f32,

    #[serde(default = "default_min_cue_ms")]
    pub min_cue_ms: i64,

    #[serde(default = "default_max_cue_ms")]
    pub max_cue_ms: i64,
}

fn default_max_lines() -> u32 {
    2
}
fn default_max_chars_per_line() -> u32 {
    42
}
fn default_target_cps() -> f32 {
    15.0
}
fn default_min_cue_ms() -> i64 {
    900
}
fn default_max_cue_ms() -> i64 {
    6500
}

impl Default for SubtitleShapeConfig {
    fn default() -> Self {
        Self {
            max_lines: default_max_lines(),
            max_chars_per_line: default_max_chars_per_line(),
            target_cps: default_target_cps(),
            min_cue_ms: default_min_cue_ms(),
            max_cue_ms: default_max_cue_ms(),
        }
    }
}

/// Batch sizing for the translate/QA stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchingConfig {
    #[serde(default = "default_translation_batch_size")]
    pub translation_batch_size: usize,
}

fn default_translation_batch_size() -> usize {
    20
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            translation_batch_size: default_translation_batch_size(),
        }
    }
}

/// TM gating thresholds (see `farsub_tm::gate`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmThresholdConfig {
    #[serde(default = "default_auto_reuse_threshold")]
    pub auto_reuse_threshold: f32,

    #[serde(default = "default_judge_threshold")]
    pub judge_threshold: f32,
}

fn default_auto_reuse_threshold() -> f32 {
    0.88
}
fn default_judge_threshold() -> f32 {
    0.82
}

impl Default for TmThresholdConfig {
    fn default() -> Self {
        Self {
            auto_reuse_threshold: default_auto_reuse_threshold(),
            judge_threshold: default_judge_threshold(),
        }
    }
}

/// Embedding model identifier and the fixed vector dimension it produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default = "default_embedding_dim")]
    pub dim: usize,

    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,

    #[serde(default = "default_qdrant_collection")]
    pub qdrant_collection: String,
}

fn default_embedding_model() -> String {
    models::EMBEDDING.to_string()
}
fn default_embedding_dim() -> usize {
    models::EMBEDDING_DIM
}
fn default_qdrant_url() -> String {
    endpoints::QDRANT_DEFAULT.clone()
}
fn default_qdrant_collection() -> String {
    "tm_entries".to_string()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dim: default_embedding_dim(),
            qdrant_url: default_qdrant_url(),
            qdrant_collection: default_qdrant_collection(),
        }
    }
}

/// One model identifier plus its comma-separated fallback chain, mirroring
/// how the agent roster was expressed upstream (`fallback_x: "a,b"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSlot {
    pub primary: String,
    #[serde(default)]
    pub fallback_csv: String,
}

impl ModelSlot {
    pub fn new(primary: &str, fallback_csv: &str) -> Self {
        Self {
            primary: primary.to_string(),
            fallback_csv: fallback_csv.to_string(),
        }
    }

    /// `[primary, ...fallbacks]` in router-consult order.
    pub fn chain(&self) -> Vec<String> {
        let mut chain = vec![self.primary.clone()];
        chain.extend(
            self.fallback_csv
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
        chain
    }
}

/// Model identifier per agent/tier, read from config so the deployment can
/// re-point to a different model without a rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRoutingConfig {
    pub strategist_low: ModelSlot,
    pub strategist_high: ModelSlot,
    pub terminologist_mid: ModelSlot,
    pub terminologist_hard: ModelSlot,
    pub translator_easy: ModelSlot,
    pub translator_mid: ModelSlot,
    pub translator_hard: ModelSlot,
    pub qa_easy: ModelSlot,
    pub qa_hard: ModelSlot,
    pub tm_judge: ModelSlot,
    pub librarian: ModelSlot,
}

impl Default for ModelRoutingConfig {
    fn default() -> Self {
        use models::*;
        Self {
            strategist_low: ModelSlot::new(STRATEGIST_LOW, ""),
            strategist_high: ModelSlot::new(STRATEGIST_HIGH, FALLBACK_STRATEGIST_HIGH),
            terminologist_mid: ModelSlot::new(TERMINOLOGIST_MID, FALLBACK_TERMINOLOGIST),
            terminologist_hard: ModelSlot::new(TERMINOLOGIST_HARD, FALLBACK_TERMINOLOGIST),
            translator_easy: ModelSlot::new(TRANSLATOR_EASY, ""),
            translator_mid: ModelSlot::new(TRANSLATOR_MID, FALLBACK_TRANSLATOR_MID),
            translator_hard: ModelSlot::new(TRANSLATOR_HARD, FALLBACK_TRANSLATOR_HARD),
            qa_easy: ModelSlot::new(QA_EASY, ""),
            qa_hard: ModelSlot::new(QA_HARD, FALLBACK_QA_HARD),
            tm_judge: ModelSlot::new(TM_JUDGE, ""),
            librarian: ModelSlot::new(LIBRARIAN, FALLBACK_LIBRARIAN),
        }
    }
}

/// ScyllaDB connection settings, same env-var-with-fallback shape the
/// persistence client used before this crate existed under its own name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_scylla_hosts")]
    pub scylla_hosts: Vec<String>,

    #[serde(default = "default_scylla_keyspace")]
    pub keyspace: String,

    #[serde(default = "default_replication_factor")]
    pub replication_factor: u8,
}

fn default_scylla_hosts() -> Vec<String> {
    std::env::var("SCYLLA_HOSTS")
        .map(|s| s.split(',').map(|h| h.trim().to_string()).collect())
        .unwrap_or_else(|_| vec!["127.0.0.1:9042".to_string()])
}

fn default_scylla_keyspace() -> String {
    std::env::var("SCYLLA_KEYSPACE").unwrap_or_else(|_| "farsub".to_string())
}

fn default_replication_factor() -> u8 {
    1
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            scylla_hosts: default_scylla_hosts(),
            keyspace: default_scylla_keyspace(),
            replication_factor: default_replication_factor(),
        }
    }
}

/// Task-queue broker the HTTP layer enqueues pipeline jobs onto. Defaults to
/// an in-process channel (`broker_url: None`); set a URL to hand jobs to an
/// out-of-process worker pool instead.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QueueConfig {
    #[serde(default)]
    pub broker_url: Option<String>,

    #[serde(default = "default_worker_concurrency")]
    pub worker_concurrency: usize,
}

fn default_worker_concurrency() -> usize {
    4
}

/// Load settings from `config/default.toml`, `config/{env}.toml` and
/// `FARSUB__`-prefixed environment variables (`__` as the nested-field
/// separator), in that priority order.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("FARSUB")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_upstream_literals() {
        let settings = Settings::default();
        assert_eq!(settings.subtitle.max_lines, 2);
        assert_eq!(settings.subtitle.max_chars_per_line, 42);
        assert_eq!(settings.subtitle.target_cps, 15.0);
        assert_eq!(settings.subtitle.min_cue_ms, 900);
        assert_eq!(settings.subtitle.max_cue_ms, 6500);
        assert_eq!(settings.batching.translation_batch_size, 20);
        assert_eq!(settings.tm.auto_reuse_threshold, 0.88);
        assert_eq!(settings.tm.judge_threshold, 0.82);
        assert_eq!(settings.embedding.model, "openai/text-embedding-3-large");
        assert_eq!(settings.embedding.dim, 3072);
    }

    #[test]
    fn model_slot_chain_prepends_primary() {
        let slot = ModelSlot::new("a", "b,c");
        assert_eq!(slot.chain(), vec!["a", "b", "c"]);

        let no_fallback = ModelSlot::new("a", "");
        assert_eq!(no_fallback.chain(), vec!["a"]);
    }

    #[test]
    fn subtitle_shape_validation_rejects_inverted_cue_bounds() {
        let mut settings = Settings::default();
        settings.subtitle.max_cue_ms = 500;
        settings.subtitle.min_cue_ms = 900;
        assert!(settings.validate_subtitle_shape().is_err());
    }

    #[test]
    fn tm_threshold_validation_rejects_judge_above_auto_reuse() {
        let mut settings = Settings::default();
        settings.tm.judge_threshold = 0.95;
        assert!(settings.validate_tm_thresholds().is_err());
    }

    #[test]
    fn provider_validation_warns_in_development_errors_in_production() {
        let mut settings = Settings::default();
        settings.providers.assemblyai_api_key.clear();
        settings.providers.openrouter_api_key.clear();

        assert!(settings.validate_providers().is_ok());

        settings.environment = RuntimeEnvironment::Production;
        assert!(settings.validate_providers().is_err());
    }
}
