//! Intake orchestration: one apply from upload through optional scoring,
//! plus the shortlist transition.
//!
//! Order within an apply is fixed:
//! job check → file check → blob upload → text extraction → profile parse →
//! (intake unit: candidate upsert → application at `parsed` → scoring) → commit.
//! Every step before the intake unit is fatal and leaves no rows behind.
//! Scoring is the one step allowed to fail without failing the apply.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::extraction::{extract_blocking, DocumentFormat, ExtractionError, TextExtractor};
use crate::intake::profile::{CandidateProfile, ProfileError, ProfileExtractor};
use crate::intake::registry::{build_draft, upsert_candidate, ContactOverrides, Resolution};
use crate::intake::scoring::{CandidateScorer, ScoringProfile};
use crate::models::{
    ApplicationRow, ApplicationStatus, CandidateRow, JobRow, ScoreVector, TransitionError,
};
use crate::storage::{resume_object_key, BlobStore, StorageError};
use crate::store::{RecruitmentStore, StoreError};

/// Upload ceiling for a single résumé.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// ────────────────────────────────────────────────────────────────────────────
// Request / result types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct ApplyRequest {
    pub job_id: Uuid,
    pub upload: ResumeUpload,
    pub contact: ContactOverrides,
}

/// What happened at the scoring step. `Unscored` keeps the reason for logs
/// and tests; it is not sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScoringOutcome {
    Scored(ScoreVector),
    Unscored {
        #[serde(skip)]
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct IntakeReceipt {
    pub application: ApplicationRow,
    pub candidate: CandidateRow,
    pub job: JobRow,
    pub scoring: ScoringOutcome,
    pub resolution: Resolution,
}

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Job {0} not found")]
    JobNotFound(Uuid),

    #[error("Only PDF and DOCX files are supported (got '{0}')")]
    UnsupportedFileType(String),

    #[error("File size must be less than {limit} bytes ({size} bytes uploaded)")]
    FileTooLarge { size: usize, limit: usize },

    #[error("résumé upload failed: {0}")]
    Storage(#[source] StorageError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    ProfileParse(#[from] ProfileError),

    #[error("Application {0} not found")]
    ApplicationNotFound(Uuid),

    #[error(transparent)]
    IllegalTransition(#[from] TransitionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy)]
pub struct IntakeSettings {
    pub max_upload_bytes: usize,
    /// Delete the uploaded blob when a later step fails. Off by default.
    pub cleanup_orphaned_uploads: bool,
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: MAX_UPLOAD_BYTES,
            cleanup_orphaned_uploads: false,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

pub struct IntakeOrchestrator {
    store: Arc<dyn RecruitmentStore>,
    blobs: Arc<dyn BlobStore>,
    extractor: Arc<dyn TextExtractor>,
    profiles: Arc<dyn ProfileExtractor>,
    scorer: Arc<dyn CandidateScorer>,
    settings: IntakeSettings,
}

impl IntakeOrchestrator {
    pub fn new(
        store: Arc<dyn RecruitmentStore>,
        blobs: Arc<dyn BlobStore>,
        extractor: Arc<dyn TextExtractor>,
        profiles: Arc<dyn ProfileExtractor>,
        scorer: Arc<dyn CandidateScorer>,
        settings: IntakeSettings,
    ) -> Self {
        Self {
            store,
            blobs,
            extractor,
            profiles,
            scorer,
            settings,
        }
    }

    pub async fn apply(&self, request: ApplyRequest) -> Result<IntakeReceipt, IntakeError> {
        let ApplyRequest {
            job_id,
            upload,
            contact,
        } = request;

        let job = self
            .store
            .find_job(job_id)
            .await?
            .ok_or(IntakeError::JobNotFound(job_id))?;

        let format = validate_upload(&upload, self.settings.max_upload_bytes)?;

        let resume_key = resume_object_key(&upload.filename);
        let content_type = upload
            .content_type
            .as_deref()
            .unwrap_or(format.content_type());
        let resume_url = self
            .blobs
            .put(&resume_key, upload.bytes.clone(), content_type)
            .await
            .map_err(|e| {
                error!(
                    "Résumé upload failed for job {} (file '{}'): {e}",
                    job.id, upload.filename
                );
                IntakeError::Storage(e)
            })?;
        info!(
            "Stored résumé '{}' for job {} at {}",
            upload.filename, job.id, resume_key
        );

        match self
            .process_upload(&job, &upload, &contact, &resume_key, &resume_url)
            .await
        {
            Ok(receipt) => Ok(receipt),
            Err(err) => {
                error!(
                    "Intake failed for job {} (file '{}'): {err}",
                    job.id, upload.filename
                );
                self.release_upload(&resume_key).await;
                Err(err)
            }
        }
    }

    /// Steps after the blob is stored: extract, parse, then the intake unit.
    async fn process_upload(
        &self,
        job: &JobRow,
        upload: &ResumeUpload,
        contact: &ContactOverrides,
        resume_key: &str,
        resume_url: &str,
    ) -> Result<IntakeReceipt, IntakeError> {
        let text = extract_blocking(
            Arc::clone(&self.extractor),
            upload.bytes.clone(),
            upload.filename.clone(),
        )
        .await?;

        let profile: CandidateProfile = self.profiles.parse(&text).await?;
        let draft = build_draft(contact, &profile, resume_key, resume_url);

        let mut unit = self.store.begin_intake().await?;
        let (candidate, resolution) = upsert_candidate(unit.as_mut(), &draft).await?;

        let status = ApplicationStatus::Applied.transition(ApplicationStatus::Parsed)?;
        let mut application = unit
            .insert_application(job.id, candidate.id, status)
            .await?;

        let scoring = self.score_candidate(&candidate, job).await;
        if let ScoringOutcome::Scored(scores) = &scoring {
            let next = application.status.transition(ApplicationStatus::Scored)?;
            application = unit.record_scores(application.id, scores, next).await?;
        }

        unit.commit().await.map_err(|e| {
            error!(
                "Intake commit failed for job {} and candidate {}: {e}",
                job.id, candidate.email
            );
            e
        })?;

        info!(
            "Application {} created for {} on job {} (status: {})",
            application.id, candidate.email, job.id, application.status
        );

        Ok(IntakeReceipt {
            application,
            candidate,
            job: job.clone(),
            scoring,
            resolution,
        })
    }

    async fn score_candidate(&self, candidate: &CandidateRow, job: &JobRow) -> ScoringOutcome {
        let profile = ScoringProfile::from(candidate);
        match self
            .scorer
            .score(&profile, &job.jd_text, &job.required_skills)
            .await
        {
            Ok(scores) => ScoringOutcome::Scored(scores),
            Err(e) => {
                warn!(
                    "Scoring failed for {} on job {}, leaving application unscored: {e}",
                    candidate.email, job.id
                );
                ScoringOutcome::Unscored {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn release_upload(&self, key: &str) {
        if !self.settings.cleanup_orphaned_uploads {
            warn!("Résumé blob {key} left orphaned by the failed intake");
            return;
        }
        match self.blobs.delete(key).await {
            Ok(()) => info!("Deleted orphaned résumé blob {key}"),
            Err(e) => warn!("Could not delete orphaned résumé blob {key}: {e}"),
        }
    }

    /// Moves an application to `shortlisted`. Already-shortlisted is a no-op;
    /// a synced application cannot go back.
    pub async fn shortlist(&self, application_id: Uuid) -> Result<ApplicationRow, IntakeError> {
        let application = self
            .store
            .find_application(application_id)
            .await?
            .ok_or(IntakeError::ApplicationNotFound(application_id))?;

        let next = application
            .status
            .transition(ApplicationStatus::Shortlisted)?;

        let updated = self
            .store
            .set_application_status(application_id, next)
            .await?
            .ok_or(IntakeError::ApplicationNotFound(application_id))?;

        info!("Application {} shortlisted", application_id);
        Ok(updated)
    }
}

/// Extension then size, before anything leaves the process.
fn validate_upload(upload: &ResumeUpload, limit: usize) -> Result<DocumentFormat, IntakeError> {
    let format = DocumentFormat::from_filename(&upload.filename)
        .ok_or_else(|| IntakeError::UnsupportedFileType(upload.filename.clone()))?;
    let size = upload.bytes.len();
    if size > limit {
        return Err(IntakeError::FileTooLarge { size, limit });
    }
    Ok(format)
}
