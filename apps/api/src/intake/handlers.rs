use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::DocumentFormat;
use crate::intake::orchestrator::{ApplyRequest, IntakeReceipt, ResumeUpload, ScoringOutcome};
use crate::intake::registry::ContactOverrides;
use crate::models::{ApplicationRow, CandidateRow, JobRow};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ApplyResponse {
    #[serde(flatten)]
    pub application: ApplicationRow,
    pub candidate: CandidateRow,
    pub job: JobRow,
    pub scoring: ScoringOutcome,
}

impl From<IntakeReceipt> for ApplyResponse {
    fn from(receipt: IntakeReceipt) -> Self {
        Self {
            application: receipt.application,
            candidate: receipt.candidate,
            job: receipt.job,
            scoring: receipt.scoring,
        }
    }
}

#[derive(Serialize)]
pub struct ShortlistResponse {
    pub message: &'static str,
    pub application: ApplicationRow,
}

/// POST /api/v1/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApplyResponse>), AppError> {
    let request = read_apply_form(&mut multipart).await?.into_request()?;
    info!(
        "Application received for job {} (file '{}', {} bytes)",
        request.job_id,
        request.upload.filename,
        request.upload.bytes.len()
    );

    let receipt = state.intake.apply(request).await?;
    info!(
        "Application {} stored for {} ({:?} candidate)",
        receipt.application.id, receipt.candidate.email, receipt.resolution
    );
    Ok((StatusCode::CREATED, Json(receipt.into())))
}

/// GET /api/v1/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
) -> Result<Json<Vec<ApplicationRow>>, AppError> {
    Ok(Json(state.store.list_applications().await?))
}

/// POST /api/v1/applications/:id/shortlist
pub async fn handle_shortlist(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
) -> Result<Json<ShortlistResponse>, AppError> {
    let application = state.intake.shortlist(application_id).await?;
    Ok(Json(ShortlistResponse {
        message: "Candidate shortlisted successfully",
        application,
    }))
}

/// GET /api/v1/candidates/:id/resume
pub async fn handle_download_resume(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let candidate = state
        .store
        .find_candidate(candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))?;

    let bytes = state.blobs.get(&candidate.resume_key).await?;

    let content_type = DocumentFormat::from_filename(&candidate.resume_key)
        .map(DocumentFormat::content_type)
        .unwrap_or("application/octet-stream");
    let filename = candidate
        .resume_key
        .rsplit('/')
        .next()
        .unwrap_or(&candidate.resume_key);

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart form
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct ApplyForm {
    job_id: Option<String>,
    upload: Option<ResumeUpload>,
    contact: ContactOverrides,
}

impl ApplyForm {
    fn into_request(self) -> Result<ApplyRequest, AppError> {
        let raw_job_id = self
            .job_id
            .ok_or_else(|| AppError::Validation("job_id is required".to_string()))?;
        let job_id = Uuid::parse_str(raw_job_id.trim()).map_err(|_| {
            AppError::Validation(format!("job_id '{raw_job_id}' is not a valid UUID"))
        })?;
        let upload = self
            .upload
            .ok_or_else(|| AppError::Validation("cv_file is required".to_string()))?;

        Ok(ApplyRequest {
            job_id,
            upload,
            contact: self.contact,
        })
    }
}

async fn read_apply_form(multipart: &mut Multipart) -> Result<ApplyForm, AppError> {
    let mut form = ApplyForm::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "cv_file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(String::from);
                let bytes = field.bytes().await.map_err(malformed)?;
                form.upload = Some(ResumeUpload {
                    filename,
                    content_type,
                    bytes,
                });
            }
            "job_id" => form.job_id = Some(field.text().await.map_err(malformed)?),
            "name" => form.contact.name = Some(field.text().await.map_err(malformed)?),
            "email" => form.contact.email = Some(field.text().await.map_err(malformed)?),
            "phone" => form.contact.phone = Some(field.text().await.map_err(malformed)?),
            "linkedin" => form.contact.linkedin = Some(field.text().await.map_err(malformed)?),
            _ => {
                field.bytes().await.map_err(malformed)?;
            }
        }
    }

    Ok(form)
}

fn malformed(e: MultipartError) -> AppError {
    AppError::Validation(format!("Malformed multipart body: {e}"))
}
