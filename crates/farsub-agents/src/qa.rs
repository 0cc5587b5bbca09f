//! QA & Polisher Agent (§4.7). A single call over every cue in the job:
//! fixes meaning and glossary compliance, scores each cue 0-100, and flags
//! issues (`meaning_drift`, `numbers_mismatch`, ...) the Librarian gate
//! reads later.

use std::collections::HashMap;

use farsub_config::ModelRoutingConfig;
use farsub_core::{ChatMessage, ChatProvider, JobGlossaryTerm, LlmRun};
use farsub_llm::LlmRouter;
use farsub_text::{normalize_persian_spacing, strip_speaker_ids};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::translator::TranslatorCueInput;
use crate::{support::call_agent_json, AgentError};

pub const AGENT_NAME: &str = "qa_polisher";

#[derive(Debug, Clone, Deserialize)]
pub struct QaPolisherOutput {
    #[serde(default)]
    pub polished: HashMap<String, String>,
    #[serde(default)]
    pub qa_scores: HashMap<String, f32>,
    #[serde(default)]
    pub issues: HashMap<String, Vec<String>>,
}

fn system_prompt() -> &'static str {
    "You are QA & Polisher Agent for EN\u{2192}FA subtitles. Fix meaning, glossary compliance, punctuation, subtitle readability."
}

fn glossary_text(glossary: &[JobGlossaryTerm]) -> String {
    if glossary.is_empty() {
        return "(none)".to_string();
    }
    glossary
        .iter()
        .map(|t| format!("- {} => {}", t.en_term, t.fa_term))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Serialize)]
struct QaPayload<'a> {
    cues: &'a [TranslatorCueInput],
    translations: &'a HashMap<String, String>,
}

fn user_prompt(
    glossary: &[JobGlossaryTerm],
    cues: &[TranslatorCueInput],
    translations: &HashMap<String, String>,
) -> String {
    let payload = QaPayload { cues, translations };
    let payload_json = serde_json::to_string(&payload).unwrap_or_default();
    format!(
        "Output STRICT JSON:\n\
{{\n  \"polished\": {{ \"cue_id\": \"fa_text\" }},\n  \"qa_scores\": {{ \"cue_id\": 0-100 }},\n  \"issues\": {{ \"cue_id\": [\"...\"] }}\n}}\n\n\
Glossary (MANDATORY):\n{}\n\nInput JSON:\n{}\n",
        glossary_text(glossary),
        payload_json
    )
}

fn schema() -> serde_json::Value {
    json!({
        "type": "object",
        "required": ["polished", "qa_scores", "issues"],
        "properties": {
            "polished": {"type": "object", "additionalProperties": {"type": "string"}},
            "qa_scores": {"type": "object", "additionalProperties": {"type": "number", "minimum": 0, "maximum": 100}},
            "issues": {"type": "object", "additionalProperties": {"type": "array", "items": {"type": "string"}}}
        }
    })
}

fn model_chain(routing: &ModelRoutingConfig, difficulty: u8) -> Vec<String> {
    if difficulty <= 3 {
        vec![
            routing.qa_easy.primary.clone(),
            "anthropic/claude-haiku-4.5".to_string(),
        ]
    } else {
        routing.qa_hard.chain()
    }
}

pub async fn run<P: ChatProvider>(
    router: &LlmRouter<P>,
    routing: &ModelRoutingConfig,
    job_id: Uuid,
    difficulty: u8,
    glossary: &[JobGlossaryTerm],
    cues: &[TranslatorCueInput],
    translations: &HashMap<String, String>,
) -> Result<(QaPolisherOutput, LlmRun), AgentError> {
    let models = model_chain(routing, difficulty);
    let messages = [
        ChatMessage::system(system_prompt()),
        ChatMessage::user(user_prompt(glossary, cues, translations)),
    ];

    let (value, run) = call_agent_json(
        router, AGENT_NAME, job_id, &models, &messages, 0.1, 2600, &schema(),
    )
    .await?;

    let mut output: QaPolisherOutput =
        serde_json::from_value(value).map_err(|source| AgentError::Json {
            agent: AGENT_NAME.to_string(),
            source,
            run: run.clone(),
        })?;

    output.polished = output
        .polished
        .into_iter()
        .map(|(k, v)| (k, normalize_persian_spacing(&strip_speaker_ids(&v))))
        .collect();

    Ok((output, run))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easy_difficulty_uses_the_fixed_single_fallback() {
        let routing = ModelRoutingConfig::default();
        let chain = model_chain(&routing, 1);
        assert_eq!(chain, vec![routing.qa_easy.primary.clone(), "anthropic/claude-haiku-4.5".to_string()]);
    }

    #[test]
    fn hard_difficulty_uses_the_configured_fallback_chain() {
        let routing = ModelRoutingConfig::default();
        assert_eq!(model_chain(&routing, 7), routing.qa_hard.chain());
    }

    #[test]
    fn schema_requires_all_three_top_level_maps() {
        let instance = json!({"polished": {}, "qa_scores": {}});
        assert!(crate::schema::validate(AGENT_NAME, &schema(), &instance).is_err());
    }
}
