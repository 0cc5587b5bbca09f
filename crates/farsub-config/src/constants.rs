//! Centralized constants: service endpoints and the agent model roster.
//!
//! Numeric subtitle-shape and TM-threshold defaults live on the `Settings`
//! structs themselves (`#[serde(default = "fn")]`) rather than here, mirroring
//! how the settings module keeps per-field defaults next to the field.

/// Service endpoints, env-overridable with a hardcoded fallback.
pub mod endpoints {
    use once_cell::sync::Lazy;

    /// OpenRouter-compatible chat/embedding endpoint (env: `OPENROUTER_BASE_URL`).
    pub static OPENROUTER_DEFAULT: Lazy<String> = Lazy::new(|| {
        std::env::var("OPENROUTER_BASE_URL")
            .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string())
    });

    /// Qdrant vector store endpoint (env: `QDRANT_URL`).
    pub static QDRANT_DEFAULT: Lazy<String> =
        Lazy::new(|| std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://127.0.0.1:6334".to_string()));
}

/// Default model identifiers per agent, keyed by the difficulty tier the
/// orchestrator routes on. One fallback list per slot, comma-separated in
/// config the way the upstream service expressed them.
pub mod models {
    pub const STRATEGIST_LOW: &str = "google/gemini-3-flash";
    pub const STRATEGIST_HIGH: &str = "deepseek/deepseek-r1-0528";
    pub const FALLBACK_STRATEGIST_HIGH: &str = "google/gemini-3-pro,openai/gpt-5.2";

    pub const TERMINOLOGIST_MID: &str = "deepseek/deepseek-v3.2";
    pub const TERMINOLOGIST_HARD: &str = "deepseek/deepseek-r1-0528";
    pub const FALLBACK_TERMINOLOGIST: &str = "google/gemini-3-pro,openai/gpt-5.2";

    pub const TRANSLATOR_EASY: &str = "anthropic/claude-haiku-4.5";
    pub const TRANSLATOR_MID: &str = "google/gemini-3-pro";
    pub const TRANSLATOR_HARD: &str = "openai/gpt-5.2";
    pub const FALLBACK_TRANSLATOR_MID: &str = "anthropic/claude-sonnet-4.5,openai/gpt-5.2";
    pub const FALLBACK_TRANSLATOR_HARD: &str = "anthropic/claude-sonnet-4.5,deepseek/deepseek-r1-0528";

    pub const QA_EASY: &str = "google/gemini-3-flash";
    pub const QA_HARD: &str = "google/gemini-3-pro";
    pub const FALLBACK_QA_HARD: &str = "anthropic/claude-sonnet-4.5,openai/gpt-5.2";

    pub const TM_JUDGE: &str = "google/gemini-3-flash";

    pub const LIBRARIAN: &str = "deepseek/deepseek-v3.2";
    pub const FALLBACK_LIBRARIAN: &str = "deepseek/deepseek-r1-0528,google/gemini-3-pro";

    pub const EMBEDDING: &str = "openai/text-embedding-3-large";
    pub const EMBEDDING_DIM: usize = 3072;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_lists_parse_as_csv() {
        let parsed: Vec<&str> = models::FALLBACK_STRATEGIST_HIGH.split(',').collect();
        assert_eq!(parsed, vec!["google/gemini-3-pro", "openai/gpt-5.2"]);
    }
}
