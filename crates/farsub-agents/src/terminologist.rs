//! Terminologist Agent (§4.4). Runs only when the Strategist flagged
//! `needs_terminologist` (or difficulty is high enough that the orchestrator
//! decides to run it anyway) — builds the job's bilingual glossary from the
//! full transcript.

use farsub_config::ModelRoutingConfig;
use farsub_core::{ChatMessage, ChatProvider, LlmRun, TermType};
use farsub_llm::LlmRouter;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{support::call_agent_json, AgentError};

pub const AGENT_NAME: &str = "terminologist";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlossaryTermOutput {
    pub en_term: String,
    pub fa_term: String,
    pub term_type: TermType,
    pub mandatory: bool,
    pub confidence: u8,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminologistOutput {
    #[serde(default)]
    pub terms: Vec<GlossaryTermOutput>,
}

fn system_prompt() -> &'static str {
    "You are Terminologist Agent for EN\u{2192}FA subtitles. Build a strict bilingual glossary."
}

fn user_prompt(transcript: &str) -> String {
    format!(
        "Extract specialized terms and output STRICT JSON:\n\
{{\n  \"terms\": [\n    {{\n      \"en_term\": \"...\",\n      \"fa_term\": \"...\",\n      \"term_type\": \"jargon|product|acronym|name|other\",\n      \"mandatory\": true,\n      \"confidence\": 0-100,\n      \"notes\": \"short context\"\n    }}\n  ]\n}}\n\nTranscript:\n{transcript}\n"
    )
}

fn schema() -> serde_json::Value {
    json!({
        "type": "object",
        "required": ["terms"],
        "properties": {
            "terms": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["en_term", "fa_term", "term_type", "mandatory", "confidence"],
                    "properties": {
                        "en_term": {"type": "string"},
                        "fa_term": {"type": "string"},
                        "term_type": {"enum": ["jargon", "product", "acronym", "name", "other"]},
                        "mandatory": {"type": "boolean"},
                        "confidence": {"type": "integer", "minimum": 0, "maximum": 100},
                        "notes": {"type": ["string", "null"]}
                    }
                }
            }
        }
    })
}

fn model_chain(routing: &ModelRoutingConfig, difficulty: u8) -> Vec<String> {
    if difficulty >= 8 {
        routing.terminologist_hard.chain()
    } else {
        routing.terminologist_mid.chain()
    }
}

pub async fn run<P: ChatProvider>(
    router: &LlmRouter<P>,
    routing: &ModelRoutingConfig,
    job_id: Uuid,
    difficulty: u8,
    transcript: &str,
) -> Result<(TerminologistOutput, LlmRun), AgentError> {
    let models = model_chain(routing, difficulty);
    let messages = [
        ChatMessage::system(system_prompt()),
        ChatMessage::user(user_prompt(transcript)),
    ];

    let (value, run) = call_agent_json(
        router, AGENT_NAME, job_id, &models, &messages, 0.1, 1400, &schema(),
    )
    .await?;

    let output: TerminologistOutput =
        serde_json::from_value(value).map_err(|source| AgentError::Json {
            agent: AGENT_NAME.to_string(),
            source,
            run: run.clone(),
        })?;

    Ok((output, run))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_eight_and_above_routes_to_the_hard_model() {
        let routing = ModelRoutingConfig::default();
        assert_eq!(model_chain(&routing, 8), routing.terminologist_hard.chain());
        assert_eq!(model_chain(&routing, 5), routing.terminologist_mid.chain());
    }

    #[test]
    fn schema_round_trips_a_valid_glossary() {
        let instance = json!({
            "terms": [{
                "en_term": "render pass",
                "fa_term": "پاس رندر",
                "term_type": "jargon",
                "mandatory": true,
                "confidence": 90,
                "notes": null
            }]
        });
        assert!(crate::schema::validate(AGENT_NAME, &schema(), &instance).is_ok());
        let parsed: TerminologistOutput = serde_json::from_value(instance).unwrap();
        assert_eq!(parsed.terms[0].term_type, TermType::Jargon);
    }

    #[test]
    fn schema_rejects_an_unknown_term_type() {
        let instance = json!({
            "terms": [{
                "en_term": "x",
                "fa_term": "y",
                "term_type": "slang",
                "mandatory": false,
                "confidence": 50
            }]
        });
        assert!(crate::schema::validate(AGENT_NAME, &schema(), &instance).is_err());
    }
}
