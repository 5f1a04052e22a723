use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::pipeline::{rank_pipeline, CandidateSummary};
use crate::models::{JobRow, JobStatus};
use crate::state::AppState;
use crate::store::NewJob;

const MAX_TITLE_CHARS: usize = 255;

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub location: String,
    pub jd_text: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub status: JobStatus,
}

impl CreateJobRequest {
    fn validate(self) -> Result<NewJob, AppError> {
        require_text("title", &self.title, Some(MAX_TITLE_CHARS))?;
        require_text("location", &self.location, Some(MAX_TITLE_CHARS))?;
        require_text("jd_text", &self.jd_text, None)?;

        Ok(NewJob {
            title: self.title,
            location: self.location,
            status: self.status,
            jd_text: self.jd_text,
            required_skills: self
                .required_skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        })
    }
}

fn require_text(field: &str, value: &str, max_chars: Option<usize>) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    if let Some(max) = max_chars {
        if value.chars().count() > max {
            return Err(AppError::Validation(format!(
                "{field} must be at most {max} characters"
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JobDetailQuery {
    pub min_score: Option<f64>,
}

#[derive(Serialize)]
pub struct JobDetailResponse {
    #[serde(flatten)]
    pub job: JobRow,
    pub candidates: Vec<CandidateSummary>,
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    let job = state.store.create_job(req.validate()?).await?;
    info!("Created job {} ({})", job.id, job.title);
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs?status=
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<ListJobsQuery>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    let status = params
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<JobStatus>)
        .transpose()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    Ok(Json(state.store.list_jobs(status).await?))
}

/// GET /api/v1/jobs/:id?min_score=
pub async fn handle_job_detail(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(params): Query<JobDetailQuery>,
) -> Result<Json<JobDetailResponse>, AppError> {
    if let Some(min) = params.min_score {
        if !(0.0..=100.0).contains(&min) {
            return Err(AppError::Validation(
                "min_score must be between 0 and 100".to_string(),
            ));
        }
    }

    let job = state
        .store
        .find_job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let entries = state.store.job_pipeline(job_id).await?;
    let candidates = rank_pipeline(entries, params.min_score);

    Ok(Json(JobDetailResponse { job, candidates }))
}
