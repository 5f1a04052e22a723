use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

const SERVICE: &str = "talent-api";

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "service": SERVICE,
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/api/v1"
    }))
}

/// GET /health
/// Returns a simple status object with service version and environment.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": SERVICE,
        "environment": state.environment
    }))
}
