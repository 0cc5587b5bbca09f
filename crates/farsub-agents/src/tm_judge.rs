//! TM-Judge Agent (§4.6). Consulted only for the confidence band
//! `[judge_threshold, auto_reuse_threshold)`: given an English cue and a
//! candidate Persian translation, decide if the candidate can be reused
//! as-is. A single model, no fallback list — this call is cheap and narrow
//! enough that burning a fallback budget on it isn't worth it.
//!
//! A malformed or unparseable judge response fails safe to "don't reuse"
//! rather than propagating an error: it's treated as the judge declining,
//! not as a pipeline failure. An exhausted model chain still propagates,
//! since that's a real transport failure rather than an ambiguous verdict.

use farsub_config::ModelRoutingConfig;
use farsub_core::{ChatMessage, ChatProvider, LlmRun};
use farsub_llm::LlmRouter;
use uuid::Uuid;

use crate::AgentError;

pub const AGENT_NAME: &str = "tm_judge";

fn system_prompt() -> &'static str {
    "You are a strict bilingual subtitle QA judge (EN\u{2192}FA)."
}

fn user_prompt(en_text: &str, fa_text: &str) -> String {
    format!(
        "Decide if the Persian translation can be reused AS-IS for the English sentence. \
Return ONLY JSON: {{\"reuse\": true/false, \"reason\": \"...\"}}.\n\nEnglish: {en_text}\nPersian: {fa_text}"
    )
}

pub async fn run<P: ChatProvider>(
    router: &LlmRouter<P>,
    routing: &ModelRoutingConfig,
    job_id: Uuid,
    en_text: &str,
    fa_text: &str,
) -> Result<(bool, LlmRun), AgentError> {
    let models = vec![routing.tm_judge.primary.clone()];
    let messages = [
        ChatMessage::system(system_prompt()),
        ChatMessage::user(user_prompt(en_text, fa_text)),
    ];

    let outcome = router
        .call_with_fallback(AGENT_NAME, Some(job_id), None, &models, &messages, 0.0, 200)
        .await;
    let run = outcome.run;

    let content = outcome.content.map_err(|source| AgentError::Llm {
        agent: AGENT_NAME.to_string(),
        source,
        run: run.clone(),
    })?;

    let reuse = serde_json::from_str::<serde_json::Value>(content.trim())
        .ok()
        .and_then(|v| v.get("reuse").and_then(|b| b.as_bool()))
        .unwrap_or(false);

    Ok((reuse, run))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use farsub_core::{ChatCompletion, ChatUsage};
    use farsub_llm::RetryPolicy;
    use std::time::Duration;

    struct FixedReply(&'static str);

    #[async_trait]
    impl ChatProvider for FixedReply {
        async fn chat(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _temperature: f32,
            _max_tokens: u32,
        ) -> farsub_core::Result<ChatCompletion> {
            Ok(ChatCompletion {
                content: self.0.to_string(),
                usage: ChatUsage::default(),
            })
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            attempts_per_model: 1,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(1),
            request_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn parses_a_true_verdict() {
        let router = LlmRouter::new(FixedReply(r#"{"reuse": true, "reason": "identical"}"#), fast_retry());
        let routing = ModelRoutingConfig::default();
        let (reuse, _run) = run(&router, &routing, Uuid::new_v4(), "hi", "سلام").await.unwrap();
        assert!(reuse);
    }

    #[tokio::test]
    async fn malformed_json_fails_safe_to_false() {
        let router = LlmRouter::new(FixedReply("not json at all"), fast_retry());
        let routing = ModelRoutingConfig::default();
        let (reuse, _run) = run(&router, &routing, Uuid::new_v4(), "hi", "سلام").await.unwrap();
        assert!(!reuse);
    }

    #[tokio::test]
    async fn missing_reuse_key_fails_safe_to_false() {
        let router = LlmRouter::new(FixedReply(r#"{"reason": "no verdict field"}"#), fast_retry());
        let routing = ModelRoutingConfig::default();
        let (reuse, _run) = run(&router, &routing, Uuid::new_v4(), "hi", "سلام").await.unwrap();
        assert!(!reuse);
    }
}
