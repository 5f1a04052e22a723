use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Each in-flight intake holds one connection through its scoring call.
    pub db_max_connections: u32,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub s3_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub llm_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
    pub app_env: String,
    pub cors_origins: Vec<String>,
    /// Delete the uploaded résumé when a later intake step fails.
    pub cleanup_orphaned_uploads: bool,
}

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:8000";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: parse_pool_size(&optional_env("DB_MAX_CONNECTIONS", "10"))
                .context("DB_MAX_CONNECTIONS must be a positive whole number")?,
            s3_bucket: optional_env("S3_BUCKET", "resumes"),
            s3_endpoint: require_env("S3_ENDPOINT")?,
            s3_region: optional_env("S3_REGION", "us-east-1"),
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_timeout_secs: optional_env("LLM_TIMEOUT_SECS", "120")
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            app_env: optional_env("APP_ENV", "development"),
            cors_origins: parse_list(&optional_env("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)),
            cleanup_orphaned_uploads: parse_flag(&optional_env("CLEANUP_ORPHANED_UPLOADS", "false"))
                .context("CLEANUP_ORPHANED_UPLOADS must be true or false")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_pool_size(raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>()? {
        0 => anyhow::bail!("pool size must be at least 1"),
        n => Ok(n),
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("unrecognised flag value '{other}'"),
    }
}
