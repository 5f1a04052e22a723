//! Candidate scoring against a job, via the LLM.
//!
//! The model's reply is only accepted when it carries all five keys as numbers
//! in [0, 100]. Anything else is a `ScoreError`, which intake treats as
//! "leave the application unscored" rather than a failed apply.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::intake::prompts::{json_system, scoring_prompt, SCORING_SYSTEM};
use crate::llm_client::{strip_json_fences, LlmClient, LlmError};
use crate::models::{CandidateRow, ScoreVector};

const SCORING_MAX_TOKENS: u32 = 500;

/// Allowed gap between the model's overall score and the rubric-weighted one
/// before a warning is logged.
const OVERALL_DRIFT_TOLERANCE: f64 = 5.0;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("scoring call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("scoring response was not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("scoring response was not a JSON object")]
    NotAnObject,

    #[error("scoring response is missing '{0}'")]
    MissingKey(&'static str),

    #[error("scoring response has a non-numeric '{0}'")]
    WrongType(&'static str),

    #[error("score '{key}' = {value} is outside 0-100")]
    OutOfRange { key: &'static str, value: f64 },
}

/// The part of a candidate the scorer sees.
#[derive(Debug, Clone, Serialize)]
pub struct ScoringProfile {
    pub name: String,
    pub skills: Vec<String>,
    pub experience_years: Option<f64>,
    pub education: Option<String>,
}

impl From<&CandidateRow> for ScoringProfile {
    fn from(candidate: &CandidateRow) -> Self {
        Self {
            name: candidate.name.clone(),
            skills: candidate.skills.clone(),
            experience_years: candidate.experience_years,
            education: candidate.education.clone(),
        }
    }
}

impl ScoringProfile {
    fn summary(&self) -> String {
        let skills = if self.skills.is_empty() {
            "N/A".to_string()
        } else {
            self.skills.join(", ")
        };
        let experience = self
            .experience_years
            .map(|y| format!("{y} years"))
            .unwrap_or_else(|| "Unknown".to_string());
        format!(
            "CANDIDATE PROFILE:\n- Name: {}\n- Skills: {}\n- Experience: {}\n- Education: {}",
            self.name,
            skills,
            experience,
            self.education.as_deref().unwrap_or("N/A")
        )
    }
}

#[async_trait]
pub trait CandidateScorer: Send + Sync {
    async fn score(
        &self,
        profile: &ScoringProfile,
        job_description: &str,
        required_skills: &[String],
    ) -> Result<ScoreVector, ScoreError>;
}

pub struct LlmCandidateScorer(pub LlmClient);

#[async_trait]
impl CandidateScorer for LlmCandidateScorer {
    async fn score(
        &self,
        profile: &ScoringProfile,
        job_description: &str,
        required_skills: &[String],
    ) -> Result<ScoreVector, ScoreError> {
        let skills = if required_skills.is_empty() {
            "None specified".to_string()
        } else {
            required_skills.join(", ")
        };
        let prompt = scoring_prompt(&profile.summary(), job_description, &skills);
        let raw = self
            .0
            .call_for_json_text(&prompt, &json_system(SCORING_SYSTEM), SCORING_MAX_TOKENS)
            .await?;

        let scores = parse_score_json(&raw)?;
        let weighted = scores.weighted_overall();
        if (scores.overall_score - weighted).abs() > OVERALL_DRIFT_TOLERANCE {
            warn!(
                "Model overall_score {:.1} drifts from rubric-weighted {:.1} for {}",
                scores.overall_score, weighted, profile.name
            );
        }
        info!("Scored {}: overall={:.1}", profile.name, scores.overall_score);
        Ok(scores)
    }
}

/// Validates the model's reply into a complete `ScoreVector`.
pub fn parse_score_json(raw: &str) -> Result<ScoreVector, ScoreError> {
    let value: Value = serde_json::from_str(strip_json_fences(raw))?;
    let object = value.as_object().ok_or(ScoreError::NotAnObject)?;

    Ok(ScoreVector {
        skill_fit: score_field(object, "skill_fit")?,
        experience_fit: score_field(object, "experience_fit")?,
        education_fit: score_field(object, "education_fit")?,
        keyword_match: score_field(object, "keyword_match")?,
        overall_score: score_field(object, "overall_score")?,
    })
}

fn score_field(object: &Map<String, Value>, key: &'static str) -> Result<f64, ScoreError> {
    let value = object
        .get(key)
        .ok_or(ScoreError::MissingKey(key))?
        .as_f64()
        .ok_or(ScoreError::WrongType(key))?;
    if !(0.0..=100.0).contains(&value) {
        return Err(ScoreError::OutOfRange { key, value });
    }
    Ok(value)
}
