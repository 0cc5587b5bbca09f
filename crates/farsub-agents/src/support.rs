//! Shared call-then-validate path every STRICT-JSON agent goes through:
//! route the call, fail over to `AgentError::Llm` if every model is
//! exhausted, parse the raw body as JSON, validate it against the agent's
//! schema, and hand the caller both the `Value` and the `LlmRun` to persist.

use farsub_core::{ChatMessage, ChatProvider, LlmRun};
use farsub_llm::LlmRouter;
use serde_json::Value;
use uuid::Uuid;

use crate::AgentError;

#[allow(clippy::too_many_arguments)]
pub(crate) async fn call_agent_json<P: ChatProvider>(
    router: &LlmRouter<P>,
    agent_name: &str,
    job_id: Uuid,
    models: &[String],
    messages: &[ChatMessage],
    temperature: f32,
    max_tokens: u32,
    schema: &Value,
) -> Result<(Value, LlmRun), AgentError> {
    let outcome = router
        .call_with_fallback(agent_name, Some(job_id), None, models, messages, temperature, max_tokens)
        .await;
    let run = outcome.run;

    let content = outcome.content.map_err(|source| AgentError::Llm {
        agent: agent_name.to_string(),
        source,
        run: run.clone(),
    })?;

    let value: Value = serde_json::from_str(content.trim()).map_err(|source| AgentError::Json {
        agent: agent_name.to_string(),
        source,
        run: run.clone(),
    })?;

    crate::schema::validate(agent_name, schema, &value).map_err(|detail| {
        AgentError::SchemaValidation {
            agent: agent_name.to_string(),
            detail,
            run: run.clone(),
        }
    })?;

    Ok((value, run))
}
