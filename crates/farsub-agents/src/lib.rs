//! Strategist/Terminologist/Translator/QA-Polisher/TM-Judge prompt contracts
//! (§4.3-§4.8). Each module builds the exact system/user prompt for its
//! agent, routes the call through `farsub_llm::LlmRouter`, and validates +
//! parses the STRICT JSON contract the agent is instructed to return.
//! `librarian` is the one module here that never calls an LLM — it's the
//! pure promotion-gate predicate that consumes the QA agent's output.

mod error;
mod schema;
mod support;

pub mod librarian;
pub mod qa;
pub mod strategist;
pub mod terminologist;
pub mod tm_judge;
pub mod translator;

pub use error::AgentError;
pub use librarian::should_store as librarian_should_store;
pub use qa::QaPolisherOutput;
pub use strategist::StrategistOutput;
pub use terminologist::{GlossaryTermOutput, TerminologistOutput};
pub use translator::TranslatorCueInput;
