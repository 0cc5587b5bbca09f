//! AssemblyAI-backed `AsrProvider`. Thin HTTP adapter: upload the WAV,
//! submit a transcription job, poll until it completes.

use std::time::Duration;

use async_trait::async_trait;
use farsub_core::{AsrProvider, AsrTranscript, AsrWord, Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const POLL_INTERVAL: Duration = Duration::from_secs(3);
const MAX_POLLS: u32 = 200;

#[derive(Clone)]
pub struct AssemblyAiAsr {
    http: Client,
    api_key: String,
    base_url: String,
}

impl AssemblyAiAsr {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, "https://api.assemblyai.com/v2".to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| Error::Asr(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_key,
            base_url,
        })
    }

    async fn upload(&self, wav_path: &str) -> Result<String> {
        let bytes = tokio::fs::read(wav_path)
            .await
            .map_err(|e| Error::Asr(format!("reading {wav_path}: {e}")))?;

        let response = self
            .http
            .post(format!("{}/upload", self.base_url))
            .header("authorization", &self.api_key)
            .body(bytes)
            .send()
            .await
            .map_err(|e| Error::Asr(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Asr(format!(
                "upload failed: {}",
                response.status()
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| Error::Asr(format!("invalid upload response: {e}")))?;
        Ok(body.upload_url)
    }

    async fn submit(&self, audio_url: &str) -> Result<String> {
        let request = SubmitRequest {
            audio_url,
            word_boost: None,
        };

        let response = self
            .http
            .post(format!("{}/transcript", self.base_url))
            .header("authorization", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Asr(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Asr(format!(
                "submit failed: {}",
                response.status()
            )));
        }

        let body: TranscriptHandle = response
            .json()
            .await
            .map_err(|e| Error::Asr(format!("invalid submit response: {e}")))?;
        Ok(body.id)
    }

    async fn poll(&self, transcript_id: &str) -> Result<TranscriptResult> {
        for _ in 0..MAX_POLLS {
            let response = self
                .http
                .get(format!("{}/transcript/{transcript_id}", self.base_url))
                .header("authorization", &self.api_key)
                .send()
                .await
                .map_err(|e| Error::Asr(e.to_string()))?;

            let body: TranscriptResult = response
                .json()
                .await
                .map_err(|e| Error::Asr(format!("invalid poll response: {e}")))?;

            match body.status.as_str() {
                "completed" => return Ok(body),
                "error" => {
                    return Err(Error::Asr(
                        body.error.unwrap_or_else(|| "unknown ASR error".to_string()),
                    ))
                }
                _ => tokio::time::sleep(POLL_INTERVAL).await,
            }
        }
        Err(Error::Asr(format!(
            "transcription {transcript_id} did not complete within the poll budget"
        )))
    }
}

#[async_trait]
impl AsrProvider for AssemblyAiAsr {
    async fn transcribe(&self, wav_path: &str) -> Result<AsrTranscript> {
        let audio_url = self.upload(wav_path).await?;
        let transcript_id = self.submit(&audio_url).await?;
        let result = self.poll(&transcript_id).await?;

        let words = result
            .words
            .into_iter()
            .map(|w| AsrWord {
                text: w.text,
                start_ms: w.start,
                end_ms: w.end,
            })
            .collect();

        Ok(AsrTranscript {
            text: result.text.unwrap_or_default(),
            words,
        })
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    audio_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    word_boost: Option<&'a [String]>,
}

#[derive(Deserialize)]
struct TranscriptHandle {
    id: String,
}

#[derive(Deserialize)]
struct TranscriptResult {
    status: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    words: Vec<WireWord>,
}

#[derive(Deserialize)]
struct WireWord {
    text: String,
    start: i64,
    end: i64,
}
