use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::intake::IntakeError;
use crate::integrations::SyncError;
use crate::storage::StorageError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("HR sync error: {0}")]
    HrSync(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("Stored file '{key}' not found")),
            StorageError::Backend(msg) => AppError::Storage(msg),
        }
    }
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::JobNotFound(_) | IntakeError::ApplicationNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            IntakeError::UnsupportedFileType(_) | IntakeError::FileTooLarge { .. } => {
                AppError::Validation(err.to_string())
            }
            IntakeError::Storage(e) => AppError::Storage(e.to_string()),
            IntakeError::Extraction(e) => {
                tracing::warn!("Résumé text extraction failed: {e}");
                AppError::UnprocessableEntity(
                    "Could not extract text from the uploaded file".to_string(),
                )
            }
            IntakeError::ProfileParse(e) => AppError::Llm(e.to_string()),
            IntakeError::IllegalTransition(e) => AppError::Conflict(e.to_string()),
            IntakeError::Store(e) => AppError::Store(e),
        }
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Empty => AppError::Validation(err.to_string()),
            SyncError::SomeApplicationsNotFound { ref missing, .. } => {
                tracing::warn!("Sync requested unknown applications: {missing:?}");
                AppError::NotFound(err.to_string())
            }
            SyncError::Downstream(msg) => AppError::HrSync(msg),
            SyncError::Store(e) => AppError::Store(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::HrSync(msg) => {
                tracing::error!("HR sync error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "HR_SYNC_ERROR",
                    "The HR system could not accept the sync".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
