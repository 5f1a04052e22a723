mod config;
mod db;
mod errors;
mod extraction;
mod intake;
mod integrations;
mod jobs;
mod llm_client;
mod models;
mod routes;
mod state;
mod storage;
mod store;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::extraction::DocumentTextExtractor;
use crate::intake::{IntakeOrchestrator, IntakeSettings, LlmCandidateScorer, LlmProfileExtractor};
use crate::integrations::successfactors::MockSuccessFactors;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::S3BlobStore;
use crate::store::PgRecruitmentStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Talent API v{} ({})",
        env!("CARGO_PKG_VERSION"),
        config.app_env
    );

    // Initialize PostgreSQL and apply migrations
    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    run_migrations(&pool).await?;
    let store = Arc::new(PgRecruitmentStore::new(pool));

    // Initialize S3 / MinIO
    let blobs = Arc::new(S3BlobStore::connect(&config).await);
    blobs
        .ensure_bucket()
        .await
        .context("résumé bucket is not reachable")?;
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // Initialize LLM client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let intake = IntakeOrchestrator::new(
        store.clone(),
        blobs.clone(),
        Arc::new(DocumentTextExtractor),
        Arc::new(LlmProfileExtractor(llm.clone())),
        Arc::new(LlmCandidateScorer(llm)),
        IntakeSettings {
            cleanup_orphaned_uploads: config.cleanup_orphaned_uploads,
            ..IntakeSettings::default()
        },
    );

    let state = AppState {
        store,
        blobs,
        intake: Arc::new(intake),
        hr_sync: Arc::new(MockSuccessFactors),
        environment: config.app_env.clone(),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&config.cors_origins)?),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin '{o}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}
