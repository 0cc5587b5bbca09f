//! OpenRouter-compatible HTTP backend for chat and embeddings.

use std::time::Duration;

use async_trait::async_trait;
use farsub_core::{ChatCompletion, ChatMessage, ChatProvider, ChatRole, ChatUsage, EmbeddingProvider};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::LlmError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Clone)]
pub struct OpenRouterClient {
    http: Client,
    config: OpenRouterConfig,
}

impl OpenRouterClient {
    pub fn new(config: OpenRouterConfig) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LlmError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.config.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for WireMessage<'a> {
    fn from(m: &'a ChatMessage) -> Self {
        Self {
            role: match m.role {
                ChatRole::System => "system",
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            },
            content: &m.content,
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize, Default)]
struct WireUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}

#[async_trait]
impl ChatProvider for OpenRouterClient {
    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> farsub_core::Result<ChatCompletion> {
        let request = ChatRequest {
            model,
            messages: messages.iter().map(WireMessage::from).collect(),
            temperature,
            max_tokens,
        };

        let response = self
            .http
            .post(self.chat_url())
            .bearer_auth(&self.config.api_key)
            .header("X-Title", "farsub-pipeline")
            .json(&request)
            .send()
            .await
            .map_err(LlmError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let err = if status.is_server_error() {
                LlmError::Network(format!("{status}: {body}"))
            } else {
                LlmError::Api(format!("{status}: {body}"))
            };
            return Err(err.into());
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("empty choices array".to_string()))?;

        let usage = body.usage.unwrap_or_default();
        Ok(ChatCompletion {
            content,
            usage: ChatUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
            },
        })
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedDatum>,
}

#[derive(Deserialize)]
struct EmbedDatum {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OpenRouterClient {
    async fn embed(&self, model: &str, texts: &[String]) -> farsub_core::Result<Vec<Vec<f32>>> {
        let request = EmbedRequest { model, input: texts };

        let response = self
            .http
            .post(self.embeddings_url())
            .bearer_auth(&self.config.api_key)
            .header("X-Title", "farsub-pipeline")
            .json(&request)
            .send()
            .await
            .map_err(LlmError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let err = if status.is_server_error() {
                LlmError::Network(format!("{status}: {body}"))
            } else {
                LlmError::Api(format!("{status}: {body}"))
            };
            return Err(err.into());
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}
