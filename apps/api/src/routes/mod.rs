pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::intake::handlers as intake;
use crate::integrations::handlers as integrations;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

/// Request body ceiling. Sits above the résumé limit so oversized uploads
/// reach intake validation and get a proper error instead of a bare 413.
const MAX_REQUEST_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Jobs
        .route(
            "/api/v1/jobs",
            post(jobs::handle_create_job).get(jobs::handle_list_jobs),
        )
        .route("/api/v1/jobs/:id", get(jobs::handle_job_detail))
        // Intake
        .route("/api/v1/apply", post(intake::handle_apply))
        .route("/api/v1/applications", get(intake::handle_list_applications))
        .route(
            "/api/v1/applications/:id/shortlist",
            post(intake::handle_shortlist),
        )
        .route(
            "/api/v1/candidates/:id/resume",
            get(intake::handle_download_resume),
        )
        // Integrations
        .route(
            "/api/v1/integrations/successfactors/sync",
            post(integrations::handle_successfactors_sync),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(state)
}
