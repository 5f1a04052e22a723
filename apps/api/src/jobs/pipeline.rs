//! Ranking a job's candidates by overall score.

use serde::Serialize;
use uuid::Uuid;

use crate::models::ApplicationStatus;
use crate::store::PipelineEntry;

/// Score given to unscored entries for ordering, so they land after every scored one.
const UNSCORED_RANK: f64 = -1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub skills: Vec<String>,
    pub experience_years: Option<f64>,
    pub application_id: Uuid,
    pub application_status: ApplicationStatus,
    pub overall_score: Option<f64>,
}

impl From<PipelineEntry> for CandidateSummary {
    fn from(entry: PipelineEntry) -> Self {
        let overall_score = entry.application.overall_score();
        Self {
            id: entry.candidate.id,
            name: entry.candidate.name,
            email: entry.candidate.email,
            skills: entry.candidate.skills,
            experience_years: entry.candidate.experience_years,
            application_id: entry.application.id,
            application_status: entry.application.status,
            overall_score,
        }
    }
}

/// Filters by `min_score` (unscored entries never pass a threshold) and sorts
/// by overall score, highest first. The sort is stable, so equal scores keep
/// their incoming order.
pub fn rank_pipeline(entries: Vec<PipelineEntry>, min_score: Option<f64>) -> Vec<CandidateSummary> {
    let mut ranked: Vec<CandidateSummary> = entries
        .into_iter()
        .map(CandidateSummary::from)
        .filter(|summary| match (min_score, summary.overall_score) {
            (None, _) => true,
            (Some(threshold), Some(score)) => score >= threshold,
            (Some(_), None) => false,
        })
        .collect();

    ranked.sort_by(|a, b| rank_of(b).total_cmp(&rank_of(a)));
    ranked
}

fn rank_of(summary: &CandidateSummary) -> f64 {
    summary.overall_score.unwrap_or(UNSCORED_RANK)
}
