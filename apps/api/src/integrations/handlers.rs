use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::integrations::{sync_applications, SyncReceipt};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub application_ids: Vec<Uuid>,
}

/// POST /api/v1/integrations/successfactors/sync
pub async fn handle_successfactors_sync(
    State(state): State<AppState>,
    Json(req): Json<SyncRequest>,
) -> Result<Json<SyncReceipt>, AppError> {
    let receipt = sync_applications(
        state.store.as_ref(),
        state.hr_sync.as_ref(),
        &req.application_ids,
    )
    .await?;
    Ok(Json(receipt))
}
