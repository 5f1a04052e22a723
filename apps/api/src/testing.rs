//! In-memory collaborators for unit and router tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use bytes::Bytes;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::extraction::{ExtractionError, TextExtractor};
use crate::integrations::successfactors::MockSuccessFactors;
use crate::integrations::{HrSync, SyncError, SyncReceipt};
use crate::intake::orchestrator::{IntakeOrchestrator, IntakeSettings};
use crate::intake::profile::{CandidateProfile, ProfileError, ProfileExtractor};
use crate::intake::scoring::{CandidateScorer, ScoreError, ScoringProfile};
use crate::models::{
    ApplicationRow, ApplicationStatus, CandidateRow, JobRow, JobStatus, ScoreVector,
};
use crate::state::AppState;
use crate::storage::{BlobStore, StorageError};
use crate::store::{
    CandidateDraft, InsertedCandidate, IntakeUnit, NewJob, PipelineEntry, RecruitmentStore, StoreError, SyncRecord,
};

// ────────────────────────────────────────────────────────────────────────────
// Sample data
// ────────────────────────────────────────────────────────────────────────────

pub fn sample_job() -> NewJob {
    NewJob {
        title: "Backend Engineer".to_string(),
        location: "Remote".to_string(),
        status: JobStatus::Active,
        jd_text: "Build and operate Rust services on PostgreSQL.".to_string(),
        required_skills: vec!["Rust".to_string(), "PostgreSQL".to_string()],
    }
}

pub fn sample_profile() -> CandidateProfile {
    CandidateProfile {
        name: Some("Jane Doe".to_string()),
        email: Some("jane@example.com".to_string()),
        phone: Some("+1 555 0100".to_string()),
        linkedin: None,
        skills: vec!["Rust".to_string(), "Tokio".to_string()],
        experience_years: Some(5.0),
        education: Some("BSc Computer Science".to_string()),
    }
}

pub fn sample_scores() -> ScoreVector {
    ScoreVector {
        skill_fit: 85.0,
        experience_fit: 75.0,
        education_fit: 90.0,
        keyword_match: 80.0,
        overall_score: 82.0,
    }
}

pub fn scores_with_overall(overall: f64) -> ScoreVector {
    ScoreVector {
        overall_score: overall,
        ..sample_scores()
    }
}

pub async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
struct MemoryState {
    jobs: Vec<JobRow>,
    candidates: Vec<CandidateRow>,
    applications: Vec<ApplicationRow>,
}

impl MemoryState {
    fn candidate(&self, id: Uuid) -> Option<&CandidateRow> {
        self.candidates.iter().find(|c| c.id == id)
    }

    fn application_mut(&mut self, id: Uuid) -> Option<&mut ApplicationRow> {
        self.applications.iter_mut().find(|a| a.id == id)
    }
}

/// Rows live in insertion order, which stands in for `created_at`.
#[derive(Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    fail_commits: AtomicBool,
    stale_email_lookups: AtomicBool,
}

impl MemoryStore {
    pub fn fail_commits(&self) {
        self.fail_commits.store(true, Ordering::SeqCst);
    }

    /// Intake email lookups miss existing rows, as when a concurrent intake
    /// inserts the same email between lookup and insert.
    pub fn stale_email_lookups(&self) {
        self.stale_email_lookups.store(true, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().expect("store mutex poisoned")
    }

    pub fn seed_job(&self, job: NewJob) -> JobRow {
        let row = job_row(job);
        self.lock().jobs.push(row.clone());
        row
    }

    pub fn seed_candidate(&self, email: &str) -> CandidateRow {
        let row = candidate_row(
            Uuid::new_v4(),
            &CandidateDraft {
                name: "Seeded Candidate".to_string(),
                email: email.to_string(),
                phone: None,
                linkedin: None,
                resume_key: format!("resumes/{}.pdf", Uuid::new_v4()),
                resume_url: "memory://seeded".to_string(),
                skills: vec!["Rust".to_string()],
                experience_years: Some(3.0),
                education: None,
            },
        );
        self.lock().candidates.push(row.clone());
        row
    }

    pub fn seed_application(
        &self,
        job_id: Uuid,
        candidate_id: Uuid,
        status: ApplicationStatus,
        scores: Option<ScoreVector>,
    ) -> ApplicationRow {
        let mut row = application_row(job_id, candidate_id, status);
        row.scores = scores.map(sqlx::types::Json);
        self.lock().applications.push(row.clone());
        row
    }

    pub fn candidate_count(&self) -> usize {
        self.lock().candidates.len()
    }

    pub fn application_count(&self) -> usize {
        self.lock().applications.len()
    }

    pub fn application_status(&self, id: Uuid) -> Option<ApplicationStatus> {
        self.lock()
            .applications
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.status)
    }
}

fn job_row(job: NewJob) -> JobRow {
    let now = Utc::now();
    JobRow {
        id: Uuid::new_v4(),
        title: job.title,
        location: job.location,
        status: job.status,
        jd_text: job.jd_text,
        required_skills: job.required_skills,
        created_at: now,
        updated_at: now,
    }
}

fn candidate_row(id: Uuid, draft: &CandidateDraft) -> CandidateRow {
    let now = Utc::now();
    CandidateRow {
        id,
        name: draft.name.clone(),
        email: draft.email.clone(),
        phone: draft.phone.clone(),
        linkedin: draft.linkedin.clone(),
        resume_key: draft.resume_key.clone(),
        resume_url: draft.resume_url.clone(),
        skills: draft.skills.clone(),
        experience_years: draft.experience_years,
        education: draft.education.clone(),
        created_at: now,
        updated_at: now,
    }
}

fn application_row(job_id: Uuid, candidate_id: Uuid, status: ApplicationStatus) -> ApplicationRow {
    let now = Utc::now();
    ApplicationRow {
        id: Uuid::new_v4(),
        job_id,
        candidate_id,
        status,
        scores: None,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl RecruitmentStore for MemoryStore {
    async fn create_job(&self, job: NewJob) -> Result<JobRow, StoreError> {
        Ok(self.seed_job(job))
    }

    async fn list_jobs(&self, status: Option<JobStatus>) -> Result<Vec<JobRow>, StoreError> {
        Ok(self
            .lock()
            .jobs
            .iter()
            .rev()
            .filter(|j| status.map_or(true, |s| j.status == s))
            .cloned()
            .collect())
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<JobRow>, StoreError> {
        Ok(self.lock().jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn job_pipeline(&self, job_id: Uuid) -> Result<Vec<PipelineEntry>, StoreError> {
        let state = self.lock();
        Ok(state
            .applications
            .iter()
            .filter(|a| a.job_id == job_id)
            .filter_map(|application| {
                Some(PipelineEntry {
                    candidate: state.candidate(application.candidate_id)?.clone(),
                    application: application.clone(),
                })
            })
            .collect())
    }

    async fn list_applications(&self) -> Result<Vec<ApplicationRow>, StoreError> {
        Ok(self.lock().applications.iter().rev().cloned().collect())
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<ApplicationRow>, StoreError> {
        Ok(self.lock().applications.iter().find(|a| a.id == id).cloned())
    }

    async fn find_candidate(&self, id: Uuid) -> Result<Option<CandidateRow>, StoreError> {
        Ok(self.lock().candidate(id).cloned())
    }

    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<ApplicationRow>, StoreError> {
        let mut state = self.lock();
        Ok(state.application_mut(id).map(|application| {
            application.status = status;
            application.updated_at = Utc::now();
            application.clone()
        }))
    }

    async fn sync_records(&self, ids: &[Uuid]) -> Result<Vec<SyncRecord>, StoreError> {
        let state = self.lock();
        Ok(state
            .applications
            .iter()
            .filter(|a| ids.contains(&a.id))
            .filter_map(|application| {
                Some(SyncRecord {
                    candidate: state.candidate(application.candidate_id)?.clone(),
                    job: state.jobs.iter().find(|j| j.id == application.job_id)?.clone(),
                    application: application.clone(),
                })
            })
            .collect())
    }

    async fn mark_synced(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        let mut state = self.lock();
        for application in state.applications.iter_mut().filter(|a| ids.contains(&a.id)) {
            application.status = ApplicationStatus::Synced;
        }
        Ok(())
    }

    async fn begin_intake(&self) -> Result<Box<dyn IntakeUnit>, StoreError> {
        Ok(Box::new(MemoryIntakeUnit {
            staged: self.lock().clone(),
            shared: Arc::clone(&self.state),
            fail_commit: self.fail_commits.load(Ordering::SeqCst),
            stale_lookups: self.stale_email_lookups.load(Ordering::SeqCst),
        }))
    }
}

/// Works on a private copy of the state; `commit` swaps it in.
struct MemoryIntakeUnit {
    staged: MemoryState,
    shared: Arc<Mutex<MemoryState>>,
    fail_commit: bool,
    stale_lookups: bool,
}

#[async_trait]
impl IntakeUnit for MemoryIntakeUnit {
    async fn find_candidate_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<CandidateRow>, StoreError> {
        if self.stale_lookups {
            return Ok(None);
        }
        Ok(self.staged.candidates.iter().find(|c| c.email == email).cloned())
    }

    async fn insert_candidate(
        &mut self,
        draft: &CandidateDraft,
    ) -> Result<InsertedCandidate, StoreError> {
        // Same fold-on-conflict as the unique email index.
        if let Some(existing) = self
            .staged
            .candidates
            .iter_mut()
            .find(|c| c.email == draft.email)
        {
            let (id, created_at) = (existing.id, existing.created_at);
            *existing = candidate_row(id, draft);
            existing.created_at = created_at;
            return Ok(InsertedCandidate {
                candidate: existing.clone(),
                created: false,
            });
        }
        let row = candidate_row(Uuid::new_v4(), draft);
        self.staged.candidates.push(row.clone());
        Ok(InsertedCandidate {
            candidate: row,
            created: true,
        })
    }

    async fn update_candidate(
        &mut self,
        id: Uuid,
        draft: &CandidateDraft,
    ) -> Result<CandidateRow, StoreError> {
        let existing = self
            .staged
            .candidates
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::Unavailable(format!("candidate {id} vanished")))?;
        let created_at = existing.created_at;
        *existing = candidate_row(id, draft);
        existing.created_at = created_at;
        Ok(existing.clone())
    }

    async fn insert_application(
        &mut self,
        job_id: Uuid,
        candidate_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<ApplicationRow, StoreError> {
        let row = application_row(job_id, candidate_id, status);
        self.staged.applications.push(row.clone());
        Ok(row)
    }

    async fn record_scores(
        &mut self,
        application_id: Uuid,
        scores: &ScoreVector,
        status: ApplicationStatus,
    ) -> Result<ApplicationRow, StoreError> {
        let application = self
            .staged
            .application_mut(application_id)
            .ok_or_else(|| StoreError::Unavailable(format!("application {application_id} vanished")))?;
        application.scores = Some(sqlx::types::Json(*scores));
        application.status = status;
        Ok(application.clone())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryIntakeUnit {
            staged,
            shared,
            fail_commit,
            ..
        } = *self;
        if fail_commit {
            return Err(StoreError::Unavailable("commit refused".to_string()));
        }
        *shared.lock().expect("store mutex poisoned") = staged;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Blob store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<BTreeMap<String, Bytes>>,
    fail_puts: AtomicBool,
}

impl MemoryBlobStore {
    pub fn fail_puts(&self) {
        self.fail_puts.store(true, Ordering::SeqCst);
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .expect("blob mutex poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("bucket offline".to_string()));
        }
        self.objects
            .lock()
            .expect("blob mutex poisoned")
            .insert(key.to_string(), bytes);
        Ok(format!("memory://resumes-bucket/{key}"))
    }

    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        self.objects
            .lock()
            .expect("blob mutex poisoned")
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.objects
            .lock()
            .expect("blob mutex poisoned")
            .remove(key);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// AI and extraction stubs
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct StubExtractor {
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl StubExtractor {
    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextExtractor for StubExtractor {
    fn extract(&self, _bytes: &[u8], _filename: &str) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(ExtractionError::Failure("corrupt document".to_string()));
        }
        Ok("Jane Doe\njane@example.com\nRust, Tokio".to_string())
    }
}

/// Returns a fixed profile, or fails every call when built with `failing`.
pub struct StubProfileExtractor {
    profile: Option<CandidateProfile>,
    calls: AtomicUsize,
}

impl StubProfileExtractor {
    pub fn returning(profile: CandidateProfile) -> Self {
        Self {
            profile: Some(profile),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            profile: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileExtractor for StubProfileExtractor {
    async fn parse(&self, _resume_text: &str) -> Result<CandidateProfile, ProfileError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.profile.clone().ok_or(ProfileError::NotAnObject)
    }
}

#[derive(Default)]
pub struct StubScorer {
    fail: AtomicBool,
}

impl StubScorer {
    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CandidateScorer for StubScorer {
    async fn score(
        &self,
        _profile: &ScoringProfile,
        _job_description: &str,
        _required_skills: &[String],
    ) -> Result<ScoreVector, ScoreError> {
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(ScoreError::MissingKey("overall_score"));
        }
        Ok(sample_scores())
    }
}

/// Downstream that refuses every batch.
pub struct RejectingHrSync;

#[async_trait]
impl HrSync for RejectingHrSync {
    async fn sync(&self, _records: &[SyncRecord]) -> Result<SyncReceipt, SyncError> {
        Err(SyncError::Downstream("SuccessFactors returned 503".to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fixture
// ────────────────────────────────────────────────────────────────────────────

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub blobs: Arc<MemoryBlobStore>,
    pub extractor: Arc<StubExtractor>,
    pub profiles: Arc<StubProfileExtractor>,
    pub scorer: Arc<StubScorer>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::default()),
            blobs: Arc::new(MemoryBlobStore::default()),
            extractor: Arc::new(StubExtractor::default()),
            profiles: Arc::new(StubProfileExtractor::returning(sample_profile())),
            scorer: Arc::new(StubScorer::default()),
        }
    }

    pub fn orchestrator(&self) -> IntakeOrchestrator {
        self.orchestrator_with_settings(IntakeSettings::default())
    }

    pub fn orchestrator_with_settings(&self, settings: IntakeSettings) -> IntakeOrchestrator {
        self.build(self.profiles.clone(), settings)
    }

    pub fn orchestrator_with_profiles(&self, profiles: StubProfileExtractor) -> IntakeOrchestrator {
        self.build(Arc::new(profiles), IntakeSettings::default())
    }

    fn build(
        &self,
        profiles: Arc<dyn ProfileExtractor>,
        settings: IntakeSettings,
    ) -> IntakeOrchestrator {
        IntakeOrchestrator::new(
            self.store.clone(),
            self.blobs.clone(),
            self.extractor.clone(),
            profiles,
            self.scorer.clone(),
            settings,
        )
    }

    pub fn state(&self) -> AppState {
        self.state_with_hr(Arc::new(MockSuccessFactors))
    }

    pub fn state_with_hr(&self, hr_sync: Arc<dyn HrSync>) -> AppState {
        AppState {
            store: self.store.clone(),
            blobs: self.blobs.clone(),
            intake: Arc::new(self.orchestrator()),
            hr_sync,
            environment: "test".to_string(),
        }
    }
}
