use std::sync::Arc;

use crate::intake::IntakeOrchestrator;
use crate::integrations::HrSync;
use crate::storage::BlobStore;
use crate::store::RecruitmentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecruitmentStore>,
    /// Read side of résumé storage; intake writes through the orchestrator.
    pub blobs: Arc<dyn BlobStore>,
    pub intake: Arc<IntakeOrchestrator>,
    /// Downstream HR system. Default: MockSuccessFactors.
    pub hr_sync: Arc<dyn HrSync>,
    /// Reported by /health (APP_ENV).
    pub environment: String,
}
