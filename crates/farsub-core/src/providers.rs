//! Trait boundaries for the external collaborators the core pipeline
//! consumes but never implements the hard logic of: ASR, LLM chat,
//! embeddings, and the TM's vector index.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsrWord {
    pub text: String,
    pub start_ms: i64,
    pub end_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AsrTranscript {
    pub text: String,
    pub words: Vec<AsrWord>,
}

/// Speech-to-text collaborator. `transcribe` takes a path to a normalized
/// 16 kHz mono PCM-WAV file produced by the AUDIO_PREP stage.
#[async_trait]
pub trait AsrProvider: Send + Sync {
    async fn transcribe(&self, wav_path: &str) -> Result<AsrTranscript>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ChatUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ChatCompletion {
    pub content: String,
    pub usage: ChatUsage,
}

/// A single provider's chat call — no retry, no fallback. The retry and
/// fallback-across-models policy lives in `farsub_llm::router`, which is
/// generic over this trait.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<ChatCompletion>;
}

/// Embedding collaborator — single model, no fallback loop (§4.5).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// A translation-memory candidate returned by the vector index, ordered by
/// ascending cosine distance from the query embedding.
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub tm_entry_id: uuid::Uuid,
    pub en_text: String,
    pub fa_text: String,
    /// Cosine distance in `[0, 2]`; similarity is `1.0 - distance`.
    pub distance: f32,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn nearest(&self, embedding: &[f32], k: usize) -> Result<Vec<VectorHit>>;

    async fn upsert(
        &self,
        tm_entry_id: uuid::Uuid,
        embedding: &[f32],
        en_text: &str,
        fa_text: &str,
    ) -> Result<()>;
}

/// Loudness-normalization/VAD-trim collaborator consumed by the AUDIO_PREP
/// stage. The core never implements the DSP itself, only this boundary.
#[async_trait]
pub trait AudioNormalizer: Send + Sync {
    /// Reads `input_path`, writes a 16 kHz mono PCM-WAV file to
    /// `output_path`.
    async fn normalize(&self, input_path: &str, output_path: &str) -> Result<()>;
}
