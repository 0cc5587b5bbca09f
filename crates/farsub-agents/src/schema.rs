//! Strict JSON-Schema validation for the agent output contracts in
//! `SPEC_FULL.md` §4.3-§4.8. Each agent module compiles its schema literal
//! on the call path (calls are a handful per job, not a hot loop) and
//! validates the raw parsed JSON before attempting to deserialize it into a
//! typed struct, so a shape mismatch surfaces as a clear validation error
//! instead of a confusing serde field-missing error.

use jsonschema::JSONSchema;
use serde_json::Value;

pub fn validate(agent: &str, schema: &Value, instance: &Value) -> Result<(), String> {
    let compiled =
        JSONSchema::compile(schema).map_err(|e| format!("invalid schema for {agent}: {e}"))?;
    if let Err(errors) = compiled.validate(instance) {
        let detail = errors
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(detail);
    }
    Ok(())
}
