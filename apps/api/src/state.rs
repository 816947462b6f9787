use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::ChatModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Pluggable chat model backend. Production: `OpenAiClient`; tests use fakes.
    pub model: Arc<dyn ChatModel>,
    pub config: Config,
}
