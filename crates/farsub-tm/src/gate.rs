//! TM gating decision (§4.6): given a cue's embedding, recall the top
//! candidate from the vector index, score it, and decide whether to
//! auto-reuse, consult the judge, or fall through to translation.

use farsub_config::{ModelRoutingConfig, TmThresholdConfig};
use farsub_core::{ChatProvider, LlmRun, VectorIndex};
use farsub_llm::LlmRouter;
use uuid::Uuid;

use crate::confidence::{composite_confidence, distance_to_similarity};
use crate::TmError;

#[derive(Debug, Clone)]
pub enum GateOutcome {
    /// `conf >= auto_reuse_threshold`, or the judge-consult band resolved to
    /// `reuse = true`.
    AutoReuse {
        tm_entry_id: Uuid,
        fa_text: String,
        confidence: f32,
    },
    /// `conf < judge_threshold`, no candidates at all, or the judge declined.
    NeedsTranslation,
}

pub struct GateResult {
    pub outcome: GateOutcome,
    /// Populated only when the judge-consult band was actually entered.
    pub judge_run: Option<LlmRun>,
}

#[allow(clippy::too_many_arguments)]
pub async fn decide<P: ChatProvider>(
    router: &LlmRouter<P>,
    routing: &ModelRoutingConfig,
    thresholds: &TmThresholdConfig,
    index: &dyn VectorIndex,
    job_id: Uuid,
    en_text: &str,
    embedding: &[f32],
) -> Result<GateResult, TmError> {
    let hits = index
        .nearest(embedding, 8)
        .await
        .map_err(|e| TmError::VectorIndex(e.to_string()))?;

    let Some(best) = hits.into_iter().next() else {
        return Ok(GateResult {
            outcome: GateOutcome::NeedsTranslation,
            judge_run: None,
        });
    };

    let sim = distance_to_similarity(best.distance);
    let confidence = composite_confidence(en_text, &best.en_text, sim);

    if confidence >= thresholds.auto_reuse_threshold {
        return Ok(GateResult {
            outcome: GateOutcome::AutoReuse {
                tm_entry_id: best.tm_entry_id,
                fa_text: best.fa_text,
                confidence,
            },
            judge_run: None,
        });
    }

    if confidence >= thresholds.judge_threshold {
        let (reuse, run) = farsub_agents::tm_judge::run(router, routing, job_id, en_text, &best.fa_text)
            .await
            .map_err(|e| TmError::Judge(e.to_string()))?;

        let outcome = if reuse {
            GateOutcome::AutoReuse {
                tm_entry_id: best.tm_entry_id,
                fa_text: best.fa_text,
                confidence,
            }
        } else {
            GateOutcome::NeedsTranslation
        };

        return Ok(GateResult {
            outcome,
            judge_run: Some(run),
        });
    }

    Ok(GateResult {
        outcome: GateOutcome::NeedsTranslation,
        judge_run: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use farsub_core::{ChatCompletion, ChatMessage, ChatUsage, Result, VectorHit};
    use farsub_llm::RetryPolicy;
    use std::time::Duration;

    struct FixedIndex(Vec<VectorHit>);

    #[async_trait]
    impl VectorIndex for FixedIndex {
        async fn nearest(&self, _embedding: &[f32], _k: usize) -> Result<Vec<VectorHit>> {
            Ok(self.0.clone())
        }

        async fn upsert(
            &self,
            _tm_entry_id: Uuid,
            _embedding: &[f32],
            _en_text: &str,
            _fa_text: &str,
        ) -> Result<()> {
            Ok(())
        }
    }

    struct NeverCalled;

    #[async_trait]
    impl ChatProvider for NeverCalled {
        async fn chat(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<ChatCompletion> {
            panic!("judge should not be consulted for this confidence band");
        }
    }

    fn router() -> LlmRouter<NeverCalled> {
        LlmRouter::new(
            NeverCalled,
            RetryPolicy {
                attempts_per_model: 1,
                initial_backoff: Duration::from_millis(1),
                max_backoff: Duration::from_millis(1),
                request_timeout: Duration::from_secs(5),
            },
        )
    }

    #[tokio::test]
    async fn high_confidence_auto_reuses_without_consulting_the_judge() {
        let index = FixedIndex(vec![VectorHit {
            tm_entry_id: Uuid::new_v4(),
            en_text: "ship 3 boxes".to_string(),
            fa_text: "سه جعبه ارسال کن".to_string(),
            distance: 0.02,
        }]);
        let result = decide(
            &router(),
            &ModelRoutingConfig::default(),
            &TmThresholdConfig::default(),
            &index,
            Uuid::new_v4(),
            "ship 3 boxes",
            &[0.1, 0.2],
        )
        .await
        .unwrap();

        assert!(matches!(result.outcome, GateOutcome::AutoReuse { .. }));
        assert!(result.judge_run.is_none());
    }

    #[tokio::test]
    async fn no_candidates_needs_translation() {
        let index = FixedIndex(vec![]);
        let result = decide(
            &router(),
            &ModelRoutingConfig::default(),
            &TmThresholdConfig::default(),
            &index,
            Uuid::new_v4(),
            "anything",
            &[0.1],
        )
        .await
        .unwrap();

        assert!(matches!(result.outcome, GateOutcome::NeedsTranslation));
    }

    #[tokio::test]
    async fn s3_near_identical_candidate_reuses_without_the_judge() {
        // "Start Docker container" vs "Start docker container": near-exact
        // vector-index match (sim≈1.0) and a matching number list ⇒
        // confidence clears auto_reuse_threshold (0.88) on its own.
        let index = FixedIndex(vec![VectorHit {
            tm_entry_id: Uuid::new_v4(),
            en_text: "Start docker container".to_string(),
            fa_text: "کانتینر داکر را شروع کن".to_string(),
            distance: 0.0,
        }]);
        let result = decide(
            &router(),
            &ModelRoutingConfig::default(),
            &TmThresholdConfig::default(),
            &index,
            Uuid::new_v4(),
            "Start Docker container",
            &[0.1],
        )
        .await
        .unwrap();

        match result.outcome {
            GateOutcome::AutoReuse { confidence, .. } => {
                assert!(confidence >= 0.88, "conf was {confidence}");
            }
            GateOutcome::NeedsTranslation => panic!("expected auto-reuse"),
        }
        assert!(result.judge_run.is_none());
    }

    #[tokio::test]
    async fn s4_mismatched_port_number_lands_in_the_judge_band() {
        // "Use port 8080" vs "Use port 9090": sim=0.95, len_ratio=1,
        // num_match=0 ⇒ conf=0.8625, between judge_threshold (0.82) and
        // auto_reuse_threshold (0.88). A judge verdict of reuse=false keeps
        // the cue flagged for translation.
        struct JudgeSaysNo;
        #[async_trait]
        impl ChatProvider for JudgeSaysNo {
            async fn chat(
                &self,
                _model: &str,
                _messages: &[ChatMessage],
                _temperature: f32,
                _max_tokens: u32,
            ) -> Result<ChatCompletion> {
                Ok(ChatCompletion {
                    content: r#"{"reuse": false, "reason": "different port number"}"#.to_string(),
                    usage: ChatUsage::default(),
                })
            }
        }

        let index = FixedIndex(vec![VectorHit {
            tm_entry_id: Uuid::new_v4(),
            en_text: "Use port 9090".to_string(),
            fa_text: "از پورت ۹۰۹۰ استفاده کن".to_string(),
            distance: 0.05,
        }]);
        let judge_router = LlmRouter::new(
            JudgeSaysNo,
            RetryPolicy {
                attempts_per_model: 1,
                initial_backoff: Duration::from_millis(1),
                max_backoff: Duration::from_millis(1),
                request_timeout: Duration::from_secs(5),
            },
        );

        let result = decide(
            &judge_router,
            &ModelRoutingConfig::default(),
            &TmThresholdConfig::default(),
            &index,
            Uuid::new_v4(),
            "Use port 8080",
            &[0.1],
        )
        .await
        .unwrap();

        assert!(result.judge_run.is_some());
        assert!(matches!(result.outcome, GateOutcome::NeedsTranslation));
    }

    #[tokio::test]
    async fn low_confidence_skips_the_judge_band_entirely() {
        let index = FixedIndex(vec![VectorHit {
            tm_entry_id: Uuid::new_v4(),
            en_text: "a completely different sentence".to_string(),
            fa_text: "یک جمله کاملا متفاوت".to_string(),
            distance: 1.9,
        }]);
        let result = decide(
            &router(),
            &ModelRoutingConfig::default(),
            &TmThresholdConfig::default(),
            &index,
            Uuid::new_v4(),
            "ship 3 boxes",
            &[0.1],
        )
        .await
        .unwrap();

        assert!(matches!(result.outcome, GateOutcome::NeedsTranslation));
        assert!(result.judge_run.is_none());
    }
}
