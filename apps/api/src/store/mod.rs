//! Persistence seam for jobs, candidates and applications.
//!
//! `RecruitmentStore` covers the plain reads and writes. Intake writes go
//! through an `IntakeUnit`, a transaction that commits the candidate upsert,
//! the new application and its scores together, or nothing at all when it is
//! dropped uncommitted.

pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    ApplicationRow, ApplicationStatus, CandidateRow, JobRow, JobStatus, ScoreVector,
};

pub use postgres::PgRecruitmentStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result of `IntakeUnit::insert_candidate`. `created` is false when a
/// concurrent intake inserted the same email first and this write updated
/// that row instead.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InsertedCandidate {
    #[sqlx(flatten)]
    pub candidate: CandidateRow,
    pub created: bool,
}

/// Fields needed to create a job posting.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub location: String,
    pub status: JobStatus,
    pub jd_text: String,
    pub required_skills: Vec<String>,
}

/// Candidate fields written on insert, and overwritten wholesale on update.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateDraft {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub resume_key: String,
    pub resume_url: String,
    pub skills: Vec<String>,
    pub experience_years: Option<f64>,
    pub education: Option<String>,
}

/// An application together with its candidate, as the pipeline ranker reads it.
#[derive(Debug, Clone)]
pub struct PipelineEntry {
    pub application: ApplicationRow,
    pub candidate: CandidateRow,
}

/// Everything the downstream sync needs about one application.
#[derive(Debug, Clone)]
pub struct SyncRecord {
    pub application: ApplicationRow,
    pub candidate: CandidateRow,
    pub job: JobRow,
}

#[async_trait]
pub trait RecruitmentStore: Send + Sync {
    async fn create_job(&self, job: NewJob) -> Result<JobRow, StoreError>;

    /// Newest first, optionally filtered by status.
    async fn list_jobs(&self, status: Option<JobStatus>) -> Result<Vec<JobRow>, StoreError>;

    async fn find_job(&self, id: Uuid) -> Result<Option<JobRow>, StoreError>;

    /// A job's applications with their candidates, oldest application first.
    async fn job_pipeline(&self, job_id: Uuid) -> Result<Vec<PipelineEntry>, StoreError>;

    /// Newest first.
    async fn list_applications(&self) -> Result<Vec<ApplicationRow>, StoreError>;

    async fn find_application(&self, id: Uuid) -> Result<Option<ApplicationRow>, StoreError>;

    async fn find_candidate(&self, id: Uuid) -> Result<Option<CandidateRow>, StoreError>;

    /// Returns `None` when the application does not exist.
    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<ApplicationRow>, StoreError>;

    /// Loads whichever of `ids` exist; callers compare counts to detect misses.
    async fn sync_records(&self, ids: &[Uuid]) -> Result<Vec<SyncRecord>, StoreError>;

    /// Moves every listed application to `synced` in one transaction.
    async fn mark_synced(&self, ids: &[Uuid]) -> Result<(), StoreError>;

    async fn begin_intake(&self) -> Result<Box<dyn IntakeUnit>, StoreError>;
}

/// One intake's database work. Dropping the unit without `commit` rolls back.
#[async_trait]
pub trait IntakeUnit: Send {
    async fn find_candidate_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<CandidateRow>, StoreError>;

    async fn insert_candidate(
        &mut self,
        draft: &CandidateDraft,
    ) -> Result<InsertedCandidate, StoreError>;

    async fn update_candidate(
        &mut self,
        id: Uuid,
        draft: &CandidateDraft,
    ) -> Result<CandidateRow, StoreError>;

    async fn insert_application(
        &mut self,
        job_id: Uuid,
        candidate_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<ApplicationRow, StoreError>;

    async fn record_scores(
        &mut self,
        application_id: Uuid,
        scores: &ScoreVector,
        status: ApplicationStatus,
    ) -> Result<ApplicationRow, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
