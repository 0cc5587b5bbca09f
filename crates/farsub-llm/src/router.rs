//! Retry-with-backoff-then-fall-through-models policy every agent call goes
//! through (§4.5). Generic over `ChatProvider` so tests can swap in a fake.

use std::time::Duration;

use chrono::Utc;
use farsub_core::{ChatMessage, ChatProvider, LlmRun, LlmRunStatus};
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::LlmError;

/// 3 attempts per model, 1s initial backoff doubling to a 10s cap, full
/// jitter, 180s per-request timeout.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts_per_model: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts_per_model: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(10),
            request_timeout: Duration::from_secs(180),
        }
    }
}

/// Result of routing a single agent call through its model chain. `run` is
/// always populated (success or failure) so the caller can persist an
/// `LlmRun` row either way; `content` carries the actual completion or the
/// terminal error.
pub struct FallbackOutcome {
    pub run: LlmRun,
    pub content: Result<String, LlmError>,
}

pub struct LlmRouter<P: ChatProvider> {
    provider: P,
    retry: RetryPolicy,
}

fn sha256_hex(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl<P: ChatProvider> LlmRouter<P> {
    pub fn new(provider: P, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    /// Tries `models` in order (`[primary, ...fallbacks]`); for each model,
    /// retries up to `attempts_per_model` times on a transient error with
    /// exponential backoff and jitter before moving to the next model.
    pub async fn call_with_fallback(
        &self,
        agent_name: &str,
        job_id: Option<Uuid>,
        cue_id: Option<Uuid>,
        models: &[String],
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> FallbackOutcome {
        let input_json = serde_json::to_string(messages).unwrap_or_default();
        let input_sha = sha256_hex(&input_json);
        let started_at = Utc::now();
        let primary_model = models.first().cloned().unwrap_or_default();

        let mut last_error = LlmError::Configuration("no models configured".to_string());

        for model in models {
            match self.call_one_model(model, messages, temperature, max_tokens).await {
                Ok(content) => {
                    let output_sha = sha256_hex(&content);
                    let run = LlmRun {
                        run_id: Uuid::new_v4(),
                        job_id,
                        cue_id,
                        agent_name: agent_name.to_string(),
                        model: model.clone(),
                        provider: Some("openrouter".to_string()),
                        started_at,
                        finished_at: Some(Utc::now()),
                        prompt_tokens: None,
                        completion_tokens: None,
                        status: LlmRunStatus::Success,
                        error_message: None,
                        input_sha,
                        output_sha: Some(output_sha),
                        meta: serde_json::Value::Null,
                    };
                    return FallbackOutcome {
                        run,
                        content: Ok(content),
                    };
                }
                Err(e) => {
                    tracing::warn!(agent_name, model, error = %e, "model attempt exhausted, trying next fallback");
                    last_error = e;
                }
            }
        }

        let error = LlmError::ModelsExhausted {
            agent_name: agent_name.to_string(),
            last_error: last_error.to_string(),
        };
        let run = LlmRun {
            run_id: Uuid::new_v4(),
            job_id,
            cue_id,
            agent_name: agent_name.to_string(),
            model: primary_model,
            provider: Some("openrouter".to_string()),
            started_at,
            finished_at: Some(Utc::now()),
            prompt_tokens: None,
            completion_tokens: None,
            status: LlmRunStatus::Error,
            error_message: Some(error.to_string()),
            input_sha,
            output_sha: None,
            meta: serde_json::Value::Null,
        };
        FallbackOutcome {
            run,
            content: Err(error),
        }
    }

    async fn call_one_model(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let mut backoff = self.retry.initial_backoff;
        let mut last_error = LlmError::Configuration("zero retry attempts configured".to_string());

        for attempt in 0..self.retry.attempts_per_model {
            if attempt > 0 {
                let jittered = backoff + Duration::from_millis(rand::thread_rng().gen_range(0..250));
                tracing::debug!(model, attempt, backoff = ?jittered, "retrying LLM call");
                tokio::time::sleep(jittered).await;
                backoff = (backoff * 2).min(self.retry.max_backoff);
            }

            // Every transport-level failure (network, non-2xx, malformed body) is
            // treated as transient at this layer and retried up to
            // `attempts_per_model` times before the caller rotates to the next
            // model in the fallback chain.
            let call = self.provider.chat(model, messages, temperature, max_tokens);
            match tokio::time::timeout(self.retry.request_timeout, call).await {
                Ok(Ok(completion)) => return Ok(completion.content),
                Ok(Err(core_err)) => {
                    last_error = LlmError::Generation(core_err.to_string());
                }
                Err(_elapsed) => {
                    last_error = LlmError::Timeout;
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use farsub_core::{ChatCompletion, ChatUsage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FlakyProvider {
        calls: Arc<AtomicUsize>,
        fail_times: usize,
    }

    #[async_trait]
    impl ChatProvider for FlakyProvider {
        async fn chat(
            &self,
            model: &str,
            _messages: &[ChatMessage],
            _temperature: f32,
            _max_tokens: u32,
        ) -> farsub_core::Result<ChatCompletion> {
            let call_index = self.calls.fetch_add(1, Ordering::SeqCst);
            if call_index < self.fail_times {
                return Err(farsub_core::Error::Llm("simulated transient failure".to_string()));
            }
            Ok(ChatCompletion {
                content: format!("ok from {model}"),
                usage: ChatUsage::default(),
            })
        }
    }

    fn fast_retry_policy() -> RetryPolicy {
        RetryPolicy {
            attempts_per_model: 3,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
            request_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures_within_one_model() {
        let provider = FlakyProvider {
            calls: Arc::new(AtomicUsize::new(0)),
            fail_times: 2,
        };
        let router = LlmRouter::new(provider, fast_retry_policy());

        let outcome = router
            .call_with_fallback(
                "translator",
                None,
                None,
                &["model-a".to_string()],
                &[ChatMessage::user("hi")],
                0.2,
                256,
            )
            .await;

        assert_eq!(outcome.content.unwrap(), "ok from model-a");
        assert_eq!(outcome.run.status, LlmRunStatus::Success);
    }

    #[tokio::test]
    async fn falls_through_to_the_first_model_that_works() {
        struct PerModelProvider;

        #[async_trait]
        impl ChatProvider for PerModelProvider {
            async fn chat(
                &self,
                model: &str,
                _messages: &[ChatMessage],
                _temperature: f32,
                _max_tokens: u32,
            ) -> farsub_core::Result<ChatCompletion> {
                if model == "model-a" {
                    Err(farsub_core::Error::Llm("model-a is down".to_string()))
                } else {
                    Ok(ChatCompletion {
                        content: format!("ok from {model}"),
                        usage: ChatUsage::default(),
                    })
                }
            }
        }

        let router = LlmRouter::new(PerModelProvider, fast_retry_policy());
        let outcome = router
            .call_with_fallback(
                "translator",
                None,
                None,
                &["model-a".to_string(), "model-b".to_string()],
                &[ChatMessage::user("hi")],
                0.2,
                256,
            )
            .await;

        assert_eq!(outcome.content.unwrap(), "ok from model-b");
        assert_eq!(outcome.run.model, "model-b");
    }

    #[tokio::test]
    async fn all_models_exhausted_reports_error_run() {
        struct AlwaysFails;

        #[async_trait]
        impl ChatProvider for AlwaysFails {
            async fn chat(
                &self,
                _model: &str,
                _messages: &[ChatMessage],
                _temperature: f32,
                _max_tokens: u32,
            ) -> farsub_core::Result<ChatCompletion> {
                Err(farsub_core::Error::Llm("down".to_string()))
            }
        }

        let router = LlmRouter::new(AlwaysFails, fast_retry_policy());
        let outcome = router
            .call_with_fallback(
                "translator",
                None,
                None,
                &["model-a".to_string(), "model-b".to_string()],
                &[ChatMessage::user("hi")],
                0.2,
                256,
            )
            .await;

        assert!(outcome.content.is_err());
        assert_eq!(outcome.run.status, LlmRunStatus::Error);
    }
}
