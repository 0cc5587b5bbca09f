//! Strategist Agent (§4.3). One call per job: reads the full transcript and
//! returns genre/tone/domain tags, a difficulty score that drives every
//! later model-routing decision, and whether the Terminologist stage is
//! worth running at all.

use farsub_config::ModelRoutingConfig;
use farsub_core::{ChatMessage, ChatProvider, LlmRun, RiskLevel};
use farsub_llm::LlmRouter;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{support::call_agent_json, AgentError};

pub const AGENT_NAME: &str = "strategist";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategistOutput {
    pub genre: String,
    pub tone: String,
    pub domain_tags: Vec<String>,
    pub difficulty_score: u8,
    pub strategist_confidence: u8,
    pub needs_terminologist: bool,
    #[serde(default)]
    pub notes_for_translator: Vec<String>,
}

fn system_prompt() -> &'static str {
    "You are Strategist Agent for EN\u{2192}FA subtitles. Be precise and structured."
}

fn user_prompt(transcript: &str) -> String {
    format!(
        "Output STRICT JSON:\n\
{{\n  \"genre\": \"tech_tutorial|interview|documentary|casual|academic|legal|medical|entertainment|other\",\n  \"tone\": \"formal|neutral|casual|humorous|persuasive|emotional\",\n  \"domain_tags\": [\"...\"],\n  \"difficulty_score\": 1-10,\n  \"strategist_confidence\": 0-100,\n  \"needs_terminologist\": true/false,\n  \"notes_for_translator\": [\"...\"]\n}}\n\nTranscript:\n{transcript}\n"
    )
}

fn schema() -> serde_json::Value {
    json!({
        "type": "object",
        "required": [
            "genre", "tone", "domain_tags", "difficulty_score",
            "strategist_confidence", "needs_terminologist"
        ],
        "properties": {
            "genre": {"type": "string"},
            "tone": {"type": "string"},
            "domain_tags": {"type": "array", "items": {"type": "string"}},
            "difficulty_score": {"type": "integer", "minimum": 1, "maximum": 10},
            "strategist_confidence": {"type": "integer", "minimum": 0, "maximum": 100},
            "needs_terminologist": {"type": "boolean"},
            "notes_for_translator": {"type": "array", "items": {"type": "string"}}
        }
    })
}

/// High risk consults the high-tier model with its configured fallback CSV;
/// every other risk level uses the low-tier model with a fixed fallback
/// pair instead of the config's (empty) fallback CSV for that slot — a
/// literal asymmetry carried over from the source routing table.
fn model_chain(routing: &ModelRoutingConfig, risk_level: RiskLevel) -> Vec<String> {
    if risk_level == RiskLevel::High {
        routing.strategist_high.chain()
    } else {
        vec![
            routing.strategist_low.primary.clone(),
            "anthropic/claude-haiku-4.5".to_string(),
            "deepseek/deepseek-v3.2".to_string(),
        ]
    }
}

pub async fn run<P: ChatProvider>(
    router: &LlmRouter<P>,
    routing: &ModelRoutingConfig,
    job_id: Uuid,
    risk_level: RiskLevel,
    transcript: &str,
) -> Result<(StrategistOutput, LlmRun), AgentError> {
    let models = model_chain(routing, risk_level);
    let messages = [
        ChatMessage::system(system_prompt()),
        ChatMessage::user(user_prompt(transcript)),
    ];

    let (value, run) =
        call_agent_json(router, AGENT_NAME, job_id, &models, &messages, 0.1, 800, &schema()).await?;

    let output: StrategistOutput =
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
    fn low_risk_uses_hardcoded_fallback_pair_not_config_csv() {
        let routing = ModelRoutingConfig::default();
        let chain = model_chain(&routing, RiskLevel::Low);
        assert_eq!(chain[0], routing.strategist_low.primary);
        assert_eq!(chain[1], "anthropic/claude-haiku-4.5");
        assert_eq!(chain[2], "deepseek/deepseek-v3.2");
    }

    #[test]
    fn high_risk_uses_the_configured_fallback_chain() {
        let routing = ModelRoutingConfig::default();
        let chain = model_chain(&routing, RiskLevel::High);
        assert_eq!(chain, routing.strategist_high.chain());
    }

    #[test]
    fn schema_accepts_a_well_formed_output() {
        let instance = json!({
            "genre": "tech_tutorial",
            "tone": "neutral",
            "domain_tags": ["gaming"],
            "difficulty_score": 5,
            "strategist_confidence": 80,
            "needs_terminologist": true,
            "notes_for_translator": []
        });
        assert!(crate::schema::validate(AGENT_NAME, &schema(), &instance).is_ok());
    }

    #[test]
    fn schema_rejects_an_out_of_range_difficulty_score() {
        let instance = json!({
            "genre": "casual",
            "tone": "casual",
            "domain_tags": [],
            "difficulty_score": 42,
            "strategist_confidence": 80,
            "needs_terminologist": false
        });
        assert!(crate::schema::validate(AGENT_NAME, &schema(), &instance).is_err());
    }
}
