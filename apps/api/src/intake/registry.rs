//! Candidate identity: which contact details win, and whether an apply creates
//! a new candidate or refreshes an existing one.
//!
//! Precedence per contact field is form value, then parsed value, then a
//! placeholder (`name` and `email` only). Blank strings count as absent.
//! Email is the identity key; a re-apply overwrites the stored profile,
//! including clearing skills or education the new résumé lacks.

use tracing::info;
use uuid::Uuid;

use crate::intake::profile::CandidateProfile;
use crate::models::CandidateRow;
use crate::store::{CandidateDraft, IntakeUnit, StoreError};

pub const PLACEHOLDER_NAME: &str = "Unknown";

/// Contact fields supplied on the apply form.
#[derive(Debug, Clone, Default)]
pub struct ContactOverrides {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Created,
    Updated,
}

/// `unknown_<8 hex>@example.com`, unique enough to never merge two strangers.
pub fn placeholder_email() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("unknown_{}@example.com", &id[..8])
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn prefer(form: &Option<String>, parsed: &Option<String>) -> Option<String> {
    present(form).or_else(|| present(parsed))
}

/// Merges form overrides with the parsed profile into the row to write.
pub fn build_draft(
    form: &ContactOverrides,
    parsed: &CandidateProfile,
    resume_key: &str,
    resume_url: &str,
) -> CandidateDraft {
    CandidateDraft {
        name: prefer(&form.name, &parsed.name).unwrap_or_else(|| PLACEHOLDER_NAME.to_string()),
        email: prefer(&form.email, &parsed.email).unwrap_or_else(placeholder_email),
        phone: prefer(&form.phone, &parsed.phone),
        linkedin: prefer(&form.linkedin, &parsed.linkedin),
        resume_key: resume_key.to_string(),
        resume_url: resume_url.to_string(),
        skills: parsed.skills.clone(),
        experience_years: parsed.experience_years,
        education: present(&parsed.education),
    }
}

/// Finds the candidate by email inside the intake unit and updates it, or inserts a new one.
pub async fn upsert_candidate(
    unit: &mut dyn IntakeUnit,
    draft: &CandidateDraft,
) -> Result<(CandidateRow, Resolution), StoreError> {
    match unit.find_candidate_by_email(&draft.email).await? {
        Some(existing) => {
            let updated = unit.update_candidate(existing.id, draft).await?;
            info!("Updated existing candidate {} ({})", updated.id, updated.email);
            Ok((updated, Resolution::Updated))
        }
        None => {
            let inserted = unit.insert_candidate(draft).await?;
            let candidate = inserted.candidate;
            if inserted.created {
                info!("Created candidate {} ({})", candidate.id, candidate.email);
                Ok((candidate, Resolution::Created))
            } else {
                info!(
                    "Candidate {} ({}) was created concurrently; updated it instead",
                    candidate.id, candidate.email
                );
                Ok((candidate, Resolution::Updated))
            }
        }
    }
}
