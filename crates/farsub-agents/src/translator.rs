//! Translator Agent (§4.7). Runs once per batch of cues flagged
//! `needs_translation`; returns a `cue_id -> fa_text` map, glossary-bound.

use std::collections::HashMap;

use farsub_config::ModelRoutingConfig;
use farsub_core::{ChatMessage, ChatProvider, JobGlossaryTerm, LlmRun};
use farsub_llm::LlmRouter;
use farsub_text::{normalize_persian_spacing, strip_speaker_ids};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::{support::call_agent_json, AgentError};

pub const AGENT_NAME: &str = "translator";

#[derive(Debug, Clone, Serialize)]
pub struct TranslatorCueInput {
    pub cue_id: Uuid,
    pub en_text: String,
}

fn system_prompt() -> &'static str {
    "You are Translator Agent for EN\u{2192}FA subtitles. Follow glossary strictly. No speaker IDs."
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

fn user_prompt(glossary: &[JobGlossaryTerm], cues: &[TranslatorCueInput]) -> String {
    let cues_json = serde_json::to_string(cues).unwrap_or_default();
    format!(
        "Translate cues to Persian. Output STRICT JSON mapping cue_id -> Persian text. No markdown.\n\n\
Glossary (MANDATORY):\n{}\n\nCues JSON:\n{}\n",
        glossary_text(glossary),
        cues_json
    )
}

fn schema() -> serde_json::Value {
    json!({
        "type": "object",
        "additionalProperties": {"type": "string"}
    })
}

/// Easy cues (difficulty <= 3) use a fast model with a fixed fallback pair;
/// mid and hard bands use the config's fallback CSV for their tier.
fn model_chain(routing: &ModelRoutingConfig, difficulty: u8) -> Vec<String> {
    if difficulty <= 3 {
        vec![
            routing.translator_easy.primary.clone(),
            "google/gemini-3-flash".to_string(),
            "deepseek/deepseek-v3.2".to_string(),
        ]
    } else if difficulty <= 7 {
        routing.translator_mid.chain()
    } else {
        routing.translator_hard.chain()
    }
}

pub async fn run<P: ChatProvider>(
    router: &LlmRouter<P>,
    routing: &ModelRoutingConfig,
    job_id: Uuid,
    difficulty: u8,
    glossary: &[JobGlossaryTerm],
    cues: &[TranslatorCueInput],
) -> Result<(HashMap<String, String>, LlmRun), AgentError> {
    let models = model_chain(routing, difficulty);
    let messages = [
        ChatMessage::system(system_prompt()),
        ChatMessage::user(user_prompt(glossary, cues)),
    ];

    let (value, run) = call_agent_json(
        router, AGENT_NAME, job_id, &models, &messages, 0.2, 2600, &schema(),
    )
    .await?;

    let raw: HashMap<String, String> =
        serde_json::from_value(value).map_err(|source| AgentError::Json {
            agent: AGENT_NAME.to_string(),
            source,
            run: run.clone(),
        })?;

    // Every value goes through the same speaker-strip + spacing pass before
    // it's accepted as a cue's translation.
    let cleaned = raw
        .into_iter()
        .map(|(k, v)| (k, normalize_persian_spacing(&strip_speaker_ids(&v))))
        .collect();

    Ok((cleaned, run))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easy_difficulty_uses_the_fixed_fallback_pair() {
        let routing = ModelRoutingConfig::default();
        let chain = model_chain(&routing, 2);
        assert_eq!(chain[0], routing.translator_easy.primary);
        assert_eq!(chain[1], "google/gemini-3-flash");
    }

    #[test]
    fn mid_and_hard_bands_use_the_configured_fallback_chain() {
        let routing = ModelRoutingConfig::default();
        assert_eq!(model_chain(&routing, 5), routing.translator_mid.chain());
        assert_eq!(model_chain(&routing, 9), routing.translator_hard.chain());
    }

    #[test]
    fn empty_glossary_renders_as_none() {
        assert_eq!(glossary_text(&[]), "(none)");
    }
}
