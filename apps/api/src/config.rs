use anyhow::{Context, Result};

use crate::ranking::engine::EligibilityPolicy;

/// Application configuration loaded from environment variables.
/// Startup fails with a descriptive error if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub openai_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Max in-flight model calls per ranking request.
    pub ranking_concurrency: usize,
    /// Which candidates are considered for ranking (all vs. ≥1 recorded skill).
    pub eligibility: EligibilityPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            ranking_concurrency: std::env::var("RANKING_CONCURRENCY")
                .unwrap_or_else(|_| "8".to_string())
                .parse::<usize>()
                .context("RANKING_CONCURRENCY must be a positive integer")?,
            eligibility: std::env::var("RANKING_ELIGIBILITY")
                .unwrap_or_else(|_| "with-skills".to_string())
                .parse()
                .map_err(anyhow::Error::msg)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
