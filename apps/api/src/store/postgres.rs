use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{
    CandidateDraft, InsertedCandidate, IntakeUnit, NewJob, PipelineEntry, RecruitmentStore,
    StoreError, SyncRecord,
};
use crate::models::{
    ApplicationRow, ApplicationStatus, CandidateRow, JobRow, JobStatus, ScoreVector,
};

#[derive(Clone)]
pub struct PgRecruitmentStore {
    pool: PgPool,
}

impl PgRecruitmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn candidates_by_id(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, CandidateRow>, StoreError> {
        let rows = sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|c| (c.id, c)).collect())
    }
}

#[async_trait]
impl RecruitmentStore for PgRecruitmentStore {
    async fn create_job(&self, job: NewJob) -> Result<JobRow, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs (id, title, location, status, jd_text, required_skills)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&job.title)
        .bind(&job.location)
        .bind(job.status.as_str())
        .bind(&job.jd_text)
        .bind(&job.required_skills)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_jobs(&self, status: Option<JobStatus>) -> Result<Vec<JobRow>, StoreError> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT * FROM jobs
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status.map(JobStatus::as_str))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<JobRow>, StoreError> {
        Ok(
            sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn job_pipeline(&self, job_id: Uuid) -> Result<Vec<PipelineEntry>, StoreError> {
        let applications = sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE job_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        let candidate_ids: Vec<Uuid> = applications.iter().map(|a| a.candidate_id).collect();
        let candidates = self.candidates_by_id(&candidate_ids).await?;

        Ok(applications
            .into_iter()
            .filter_map(|application| {
                // Several applications can share a candidate, so clone rather than remove.
                let candidate = candidates.get(&application.candidate_id)?.clone();
                Some(PipelineEntry {
                    application,
                    candidate,
                })
            })
            .collect())
    }

    async fn list_applications(&self) -> Result<Vec<ApplicationRow>, StoreError> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<ApplicationRow>, StoreError> {
        Ok(
            sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_candidate(&self, id: Uuid) -> Result<Option<CandidateRow>, StoreError> {
        Ok(
            sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<ApplicationRow>, StoreError> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            r#"
            UPDATE applications
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn sync_records(&self, ids: &[Uuid]) -> Result<Vec<SyncRecord>, StoreError> {
        let applications = sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE id = ANY($1) ORDER BY created_at ASC",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let candidate_ids: Vec<Uuid> = applications.iter().map(|a| a.candidate_id).collect();
        let candidates = self.candidates_by_id(&candidate_ids).await?;

        let job_ids: Vec<Uuid> = applications.iter().map(|a| a.job_id).collect();
        let jobs: HashMap<Uuid, JobRow> =
            sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ANY($1)")
                .bind(&job_ids)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(|j| (j.id, j))
                .collect();

        Ok(applications
            .into_iter()
            .filter_map(|application| {
                let candidate = candidates.get(&application.candidate_id)?.clone();
                let job = jobs.get(&application.job_id)?.clone();
                Some(SyncRecord {
                    application,
                    candidate,
                    job,
                })
            })
            .collect())
    }

    async fn mark_synced(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "UPDATE applications SET status = $1, updated_at = NOW() WHERE id = ANY($2)",
        )
        .bind(ApplicationStatus::Synced.as_str())
        .bind(ids)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn begin_intake(&self) -> Result<Box<dyn IntakeUnit>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgIntakeUnit { tx }))
    }
}

/// Intake unit over a live transaction; sqlx rolls it back on drop.
struct PgIntakeUnit {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl IntakeUnit for PgIntakeUnit {
    async fn find_candidate_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<CandidateRow>, StoreError> {
        Ok(
            sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE email = $1")
                .bind(email)
                .fetch_optional(&mut *self.tx)
                .await?,
        )
    }

    async fn insert_candidate(
        &mut self,
        draft: &CandidateDraft,
    ) -> Result<InsertedCandidate, StoreError> {
        // A concurrent first-time apply with the same email may win the race;
        // fold into its row instead of failing on the unique index.
        // `xmax = 0` only holds for a row this statement inserted.
        Ok(sqlx::query_as::<_, InsertedCandidate>(
            r#"
            INSERT INTO candidates
                (id, name, email, phone, linkedin, resume_key, resume_url,
                 skills, experience_years, education)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (email) DO UPDATE SET
                name = EXCLUDED.name,
                phone = EXCLUDED.phone,
                linkedin = EXCLUDED.linkedin,
                resume_key = EXCLUDED.resume_key,
                resume_url = EXCLUDED.resume_url,
                skills = EXCLUDED.skills,
                experience_years = EXCLUDED.experience_years,
                education = EXCLUDED.education,
                updated_at = NOW()
            RETURNING *, (xmax = 0) AS created
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.phone)
        .bind(&draft.linkedin)
        .bind(&draft.resume_key)
        .bind(&draft.resume_url)
        .bind(&draft.skills)
        .bind(draft.experience_years)
        .bind(&draft.education)
        .fetch_one(&mut *self.tx)
        .await?)
    }

    async fn update_candidate(
        &mut self,
        id: Uuid,
        draft: &CandidateDraft,
    ) -> Result<CandidateRow, StoreError> {
        Ok(sqlx::query_as::<_, CandidateRow>(
            r#"
            UPDATE candidates SET
                name = $2,
                phone = $3,
                linkedin = $4,
                resume_key = $5,
                resume_url = $6,
                skills = $7,
                experience_years = $8,
                education = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.phone)
        .bind(&draft.linkedin)
        .bind(&draft.resume_key)
        .bind(&draft.resume_url)
        .bind(&draft.skills)
        .bind(draft.experience_years)
        .bind(&draft.education)
        .fetch_one(&mut *self.tx)
        .await?)
    }

    async fn insert_application(
        &mut self,
        job_id: Uuid,
        candidate_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<ApplicationRow, StoreError> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            r#"
            INSERT INTO applications (id, job_id, candidate_id, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(job_id)
        .bind(candidate_id)
        .bind(status.as_str())
        .fetch_one(&mut *self.tx)
        .await?)
    }

    async fn record_scores(
        &mut self,
        application_id: Uuid,
        scores: &ScoreVector,
        status: ApplicationStatus,
    ) -> Result<ApplicationRow, StoreError> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            r#"
            UPDATE applications
            SET scores = $1, status = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(Json(*scores))
        .bind(status.as_str())
        .bind(application_id)
        .fetch_one(&mut *self.tx)
        .await?)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}
