// Résumé intake: upload, extraction, profile parsing, candidate upsert, scoring.
// All LLM calls go through llm_client; persistence goes through store::IntakeUnit.

pub mod handlers;
pub mod orchestrator;
pub mod profile;
pub mod prompts;
pub mod registry;
pub mod scoring;

pub use orchestrator::{IntakeError, IntakeOrchestrator, IntakeSettings};
pub use profile::LlmProfileExtractor;
pub use scoring::LlmCandidateScorer;
