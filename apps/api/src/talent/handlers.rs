//! Axum route handlers for the talent pool: search, candidate comments,
//! meeting scheduling, and stored analysis history.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::info;

use crate::errors::AppError;
use crate::models::analysis::{AnalysisResultRow, RankedCandidate};
use crate::ranking::engine::{score_pool, RankingOptions};
use crate::ranking::handlers::validate_ranking_params;
use crate::state::AppState;
use crate::store;
use crate::talent::search::{build_search_prompt, SEARCH_SYSTEM, SEARCH_TEMPERATURE};

const DEFAULT_SEARCH_LIMIT: usize = 20;
const MIN_QUERY_CHARS: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub limit: Option<usize>,
    pub min_relevance: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub comment: String,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub candidate_id: i64,
    pub comment: String,
    pub tags: Vec<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleMeetingRequest {
    pub candidate_email: String,
    pub candidate_name: String,
    /// YYYY-MM-DD
    pub meeting_date: String,
    /// HH:MM
    pub meeting_time: String,
    pub meeting_type: Option<String>,
    pub meeting_link: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleMeetingResponse {
    pub success: bool,
    pub message: String,
    pub meeting_id: i64,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/talent-pool/search
///
/// Ranks the whole candidate pool by relevance to a free-text query, using
/// the same engine, failure policy, and ordering guarantees as job ranking.
pub async fn handle_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<RankedCandidate>>, AppError> {
    let query = request.query.trim().to_string();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Err(AppError::Validation(format!(
            "query must be at least {MIN_QUERY_CHARS} characters"
        )));
    }
    let limit = request.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let min_relevance = request.min_relevance.unwrap_or(0.0);
    validate_ranking_params(limit, min_relevance)?;

    let pool = store::candidates::list_candidate_profiles(&state.db).await?;
    let pool = state.config.eligibility.apply(pool);
    info!("Searching {} candidates for query \"{query}\"", pool.len());

    let opts = RankingOptions {
        limit,
        min_score: min_relevance,
        concurrency: state.config.ranking_concurrency,
    };

    let ranked = score_pool(
        Arc::clone(&state.model),
        pool,
        |candidate| build_search_prompt(&query, candidate),
        SEARCH_SYSTEM,
        SEARCH_TEMPERATURE,
        &opts,
    )
    .await?;

    info!("Search \"{query}\" returned {} candidates", ranked.len());
    Ok(Json(ranked))
}

/// POST /api/candidates/:id/comments
pub async fn handle_add_comment(
    State(state): State<AppState>,
    Path(candidate_id): Path<i64>,
    Json(request): Json<CommentRequest>,
) -> Result<Json<CommentRow>, AppError> {
    if request.comment.trim().is_empty() {
        return Err(AppError::Validation("comment cannot be empty".to_string()));
    }

    let candidate = store::candidates::get_candidate_profile(&state.db, candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))?;

    let comment: CommentRow = sqlx::query_as(
        r#"
        INSERT INTO candidate_comments (candidate_id, comment, tags, created_by)
        VALUES ($1, $2, $3, 'recruiter')
        RETURNING id, candidate_id, comment, tags, created_by, created_at
        "#,
    )
    .bind(candidate.id)
    .bind(request.comment.trim())
    .bind(request.tags.unwrap_or_default())
    .fetch_one(&state.db)
    .await?;

    Ok(Json(comment))
}

/// GET /api/candidates/:id/comments
pub async fn handle_get_comments(
    State(state): State<AppState>,
    Path(candidate_id): Path<i64>,
) -> Result<Json<Vec<CommentRow>>, AppError> {
    let comments: Vec<CommentRow> = sqlx::query_as(
        r#"
        SELECT id, candidate_id, comment, tags, created_by, created_at
        FROM candidate_comments
        WHERE candidate_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(candidate_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(comments))
}

/// POST /api/meetings/schedule
///
/// Persists the meeting so recruiters can track scheduled conversations.
/// Invitation delivery is out of scope for this service.
pub async fn handle_schedule_meeting(
    State(state): State<AppState>,
    Json(request): Json<ScheduleMeetingRequest>,
) -> Result<Json<ScheduleMeetingResponse>, AppError> {
    if request.candidate_email.trim().is_empty() || !request.candidate_email.contains('@') {
        return Err(AppError::Validation(
            "candidate_email must be a valid email address".to_string(),
        ));
    }

    let meeting_type = request.meeting_type.unwrap_or_else(|| "online".to_string());

    let (meeting_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO meetings
            (candidate_email, candidate_name, meeting_date, meeting_time,
             meeting_type, meeting_link, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(request.candidate_email.trim())
    .bind(&request.candidate_name)
    .bind(&request.meeting_date)
    .bind(&request.meeting_time)
    .bind(&meeting_type)
    .bind(&request.meeting_link)
    .bind(&request.notes)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(ScheduleMeetingResponse {
        success: true,
        message: format!(
            "Meeting with {} scheduled for {} {}",
            request.candidate_name, request.meeting_date, request.meeting_time
        ),
        meeting_id,
    }))
}

/// GET /api/candidates/:id/analysis-results
///
/// Stored analysis history for one candidate, newest first.
pub async fn handle_get_analysis_results(
    State(state): State<AppState>,
    Path(candidate_id): Path<i64>,
) -> Result<Json<Vec<AnalysisResultRow>>, AppError> {
    let results = store::results::list_candidate_results(&state.db, candidate_id).await?;
    Ok(Json(results))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_deserializes_with_defaults() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"query": "senior rust engineer"}"#).unwrap();
        assert_eq!(request.query, "senior rust engineer");
        assert!(request.limit.is_none());
        assert!(request.min_relevance.is_none());
    }

    #[test]
    fn test_schedule_request_accepts_optional_fields() {
        let request: ScheduleMeetingRequest = serde_json::from_str(
            r#"{
                "candidate_email": "ana@example.com",
                "candidate_name": "Ana Souza",
                "meeting_date": "2026-09-15",
                "meeting_time": "14:30"
            }"#,
        )
        .unwrap();
        assert!(request.meeting_type.is_none());
        assert!(request.meeting_link.is_none());
    }
}
