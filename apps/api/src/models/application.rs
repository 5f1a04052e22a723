use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Status state machine
// ────────────────────────────────────────────────────────────────────────────

/// Lifecycle of an application. Variants are declared in their forward order,
/// so the derived `Ord` is the order the state machine moves in.
///
/// `Applied` is nominal: intake creates applications already at `Parsed`.
/// `Shortlisted` and `Synced` are reached through operator actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Parsed,
    Scored,
    Shortlisted,
    Synced,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal status transition from '{from}' to '{to}'")]
pub struct TransitionError {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
}

#[derive(Debug, Error)]
#[error("unknown application status '{0}'")]
pub struct UnknownApplicationStatus(pub String);

impl ApplicationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Parsed => "parsed",
            ApplicationStatus::Scored => "scored",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Synced => "synced",
        }
    }

    /// The single transition function. Moving forward (skipping states is fine)
    /// or staying put succeeds; any backward move is rejected.
    pub fn transition(self, next: ApplicationStatus) -> Result<ApplicationStatus, TransitionError> {
        if next >= self {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownApplicationStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applied" => Ok(ApplicationStatus::Applied),
            "parsed" => Ok(ApplicationStatus::Parsed),
            "scored" => Ok(ApplicationStatus::Scored),
            "shortlisted" => Ok(ApplicationStatus::Shortlisted),
            "synced" => Ok(ApplicationStatus::Synced),
            other => Err(UnknownApplicationStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = UnknownApplicationStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Score vector
// ────────────────────────────────────────────────────────────────────────────

/// Rubric weights the scoring model is instructed to apply.
pub const SKILL_FIT_WEIGHT: f64 = 0.40;
pub const EXPERIENCE_FIT_WEIGHT: f64 = 0.30;
pub const EDUCATION_FIT_WEIGHT: f64 = 0.15;
pub const KEYWORD_MATCH_WEIGHT: f64 = 0.15;

/// Four sub-scores plus the model's overall score, each in [0, 100].
/// Only ever constructed complete, so a partial vector cannot be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreVector {
    pub skill_fit: f64,
    pub experience_fit: f64,
    pub education_fit: f64,
    pub keyword_match: f64,
    pub overall_score: f64,
}

impl ScoreVector {
    /// Overall score recomputed from the sub-scores with the rubric weights.
    /// Used only to flag drift in the model's own arithmetic; never stored.
    pub fn weighted_overall(&self) -> f64 {
        SKILL_FIT_WEIGHT * self.skill_fit
            + EXPERIENCE_FIT_WEIGHT * self.experience_fit
            + EDUCATION_FIT_WEIGHT * self.education_fit
            + KEYWORD_MATCH_WEIGHT * self.keyword_match
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Row
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    pub scores: Option<Json<ScoreVector>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationRow {
    pub fn overall_score(&self) -> Option<f64> {
        self.scores.as_ref().map(|s| s.0.overall_score)
    }
}
