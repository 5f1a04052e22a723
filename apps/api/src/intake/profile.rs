//! Profile extraction: résumé text to a structured `CandidateProfile` via the LLM.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::intake::prompts::{json_system, PROFILE_PARSE_PROMPT, PROFILE_PARSE_SYSTEM};
use crate::llm_client::{strip_json_fences, LlmClient, LlmError};

const PROFILE_MAX_TOKENS: u32 = 1000;

/// Candidate fields the model read off the résumé. Anything absent is `None`
/// (or an empty skill list); the registry decides what fills the gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_years")]
    pub experience_years: Option<f64>,
    #[serde(default)]
    pub education: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile extraction call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("profile response was not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("profile response was not a JSON object")]
    NotAnObject,
}

#[async_trait]
pub trait ProfileExtractor: Send + Sync {
    async fn parse(&self, resume_text: &str) -> Result<CandidateProfile, ProfileError>;
}

/// Production extractor: one LLM call per résumé.
pub struct LlmProfileExtractor(pub LlmClient);

#[async_trait]
impl ProfileExtractor for LlmProfileExtractor {
    async fn parse(&self, resume_text: &str) -> Result<CandidateProfile, ProfileError> {
        let prompt = PROFILE_PARSE_PROMPT.replace("{resume_text}", resume_text);
        let raw = self
            .0
            .call_for_json_text(&prompt, &json_system(PROFILE_PARSE_SYSTEM), PROFILE_MAX_TOKENS)
            .await?;

        let profile = parse_profile_json(&raw)?;
        info!(
            "Parsed résumé profile: name_found={}, email_found={}, skills={}",
            profile.name.is_some(),
            profile.email.is_some(),
            profile.skills.len()
        );
        Ok(profile)
    }
}

/// Decodes the model's reply. Fences are tolerated; the payload must be an object.
pub fn parse_profile_json(raw: &str) -> Result<CandidateProfile, ProfileError> {
    let value: Value = serde_json::from_str(strip_json_fences(raw))?;
    if !value.is_object() {
        return Err(ProfileError::NotAnObject);
    }
    Ok(serde_json::from_value(value)?)
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Models sometimes answer `"5"` or `"5+ years"`; keep what parses, drop the rest.
fn lenient_years<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let digits: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            digits.parse().ok()
        }
        _ => None,
    })
}
