pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::ranking::handlers as ranking;
use crate::state::AppState;
use crate::talent::handlers as talent;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Ranking pipeline
        .route(
            "/api/candidates/ranking",
            post(ranking::handle_rank_candidates),
        )
        .route("/api/ai/analyze", post(ranking::handle_analyze))
        // Talent pool
        .route("/api/talent-pool/search", post(talent::handle_search))
        .route(
            "/api/candidates/:id/comments",
            post(talent::handle_add_comment).get(talent::handle_get_comments),
        )
        .route(
            "/api/candidates/:id/analysis-results",
            get(talent::handle_get_analysis_results),
        )
        .route("/api/meetings/schedule", post(talent::handle_schedule_meeting))
        .with_state(state)
}
