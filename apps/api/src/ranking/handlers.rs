//! Axum route handlers for compatibility ranking and single-candidate analysis.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::analysis::{CandidateAnalysis, RankedCandidate, Recommendation};
use crate::ranking::engine::{score_pool, RankingOptions};
use crate::ranking::parser::parse_analysis;
use crate::ranking::prompts::{build_analysis_prompt, ANALYSIS_SYSTEM, ANALYSIS_TEMPERATURE};
use crate::state::AppState;
use crate::store;

const DEFAULT_RANKING_LIMIT: usize = 10;
const MAX_RANKING_LIMIT: usize = 100;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RankingRequest {
    pub job_id: i64,
    pub limit: Option<usize>,
    pub min_compatibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub candidate_id: i64,
    pub job_id: i64,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub candidate_id: i64,
    pub job_id: i64,
    pub compatibility_score: f64,
    pub cultural_fit_score: f64,
    pub professional_fit_score: f64,
    pub ai_analysis: String,
    pub red_flags: Vec<String>,
    pub strengths: Vec<String>,
    pub recommendation: Recommendation,
    pub suggested_questions: Vec<String>,
}

/// Validates limit/threshold bounds shared by ranking and search requests.
pub fn validate_ranking_params(limit: usize, min_score: f64) -> Result<(), AppError> {
    if limit == 0 || limit > MAX_RANKING_LIMIT {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_RANKING_LIMIT}"
        )));
    }
    if !(0.0..=100.0).contains(&min_score) {
        return Err(AppError::Validation(
            "min_compatibility must be between 0 and 100".to_string(),
        ));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/candidates/ranking
///
/// Scores every eligible candidate against the job with one model call each,
/// then filters by minimum compatibility, sorts, and truncates. Per-candidate
/// model failures exclude that candidate only.
pub async fn handle_rank_candidates(
    State(state): State<AppState>,
    Json(request): Json<RankingRequest>,
) -> Result<Json<Vec<RankedCandidate>>, AppError> {
    let limit = request.limit.unwrap_or(DEFAULT_RANKING_LIMIT);
    let min_compatibility = request.min_compatibility.unwrap_or(0.0);
    validate_ranking_params(limit, min_compatibility)?;

    let job = store::jobs::get_job_profile(&state.db, request.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", request.job_id)))?;

    let pool = store::candidates::list_candidate_profiles(&state.db).await?;
    let pool = state.config.eligibility.apply(pool);
    info!(
        "Ranking {} eligible candidates for job {} ({})",
        pool.len(),
        job.id,
        job.title
    );

    let opts = RankingOptions {
        limit,
        min_score: min_compatibility,
        concurrency: state.config.ranking_concurrency,
    };

    let ranked = score_pool(
        Arc::clone(&state.model),
        pool,
        |candidate| build_analysis_prompt(&job, candidate),
        ANALYSIS_SYSTEM,
        ANALYSIS_TEMPERATURE,
        &opts,
    )
    .await?;

    // History writes go through the DAL after the engine returns; a failed
    // insert degrades to a warning, never a failed ranking.
    for entry in &ranked {
        let analysis = CandidateAnalysis {
            compatibility_score: entry.compatibility_score,
            cultural_fit_score: entry.cultural_fit_score,
            professional_fit_score: entry.professional_fit_score,
            analysis: entry.ai_analysis.clone(),
            red_flags: entry.red_flags.clone(),
            strengths: vec![],
            suggested_questions: vec![],
            recommendation: entry.recommendation,
        };
        if let Err(e) = store::results::insert_analysis_result(
            &state.db,
            entry.candidate_id,
            Some(job.id),
            &analysis,
        )
        .await
        {
            warn!(
                "Failed to persist analysis result for candidate {}: {e}",
                entry.candidate_id
            );
        }
    }

    info!(
        "Ranking for job {} returned {} candidates (limit {limit}, min {min_compatibility})",
        job.id,
        ranked.len()
    );

    Ok(Json(ranked))
}

/// POST /api/ai/analyze
///
/// Detailed single-candidate analysis: same prompt/model/parser chain as
/// ranking, but a singular result with strengths and interview questions.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let candidate = store::candidates::get_candidate_profile(&state.db, request.candidate_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Candidate {} not found", request.candidate_id))
        })?;

    let job = store::jobs::get_job_profile(&state.db, request.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", request.job_id)))?;

    let prompt = build_analysis_prompt(&job, &candidate);
    let reply = state
        .model
        .complete(&prompt, ANALYSIS_SYSTEM, ANALYSIS_TEMPERATURE)
        .await
        .map_err(|e| {
            if e.is_auth() {
                AppError::ModelAuth(e.to_string())
            } else {
                AppError::Model(e.to_string())
            }
        })?;

    let analysis = parse_analysis(&reply);

    if let Err(e) = store::results::insert_analysis_result(
        &state.db,
        candidate.id,
        Some(job.id),
        &analysis,
    )
    .await
    {
        warn!(
            "Failed to persist analysis result for candidate {}: {e}",
            candidate.id
        );
    }

    Ok(Json(AnalyzeResponse {
        candidate_id: candidate.id,
        job_id: job.id,
        compatibility_score: analysis.compatibility_score,
        cultural_fit_score: analysis.cultural_fit_score,
        professional_fit_score: analysis.professional_fit_score,
        ai_analysis: analysis.analysis,
        red_flags: analysis.red_flags,
        strengths: analysis.strengths,
        recommendation: analysis.recommendation,
        suggested_questions: analysis.suggested_questions,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_bounds() {
        assert!(validate_ranking_params(1, 0.0).is_ok());
        assert!(validate_ranking_params(100, 100.0).is_ok());
        assert!(validate_ranking_params(5, 50.0).is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_and_oversized_limit() {
        assert!(validate_ranking_params(0, 50.0).is_err());
        assert!(validate_ranking_params(101, 50.0).is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        assert!(validate_ranking_params(10, -0.1).is_err());
        assert!(validate_ranking_params(10, 100.1).is_err());
    }

    #[test]
    fn test_ranking_request_defaults_are_applied_by_handler_contract() {
        let request: RankingRequest =
            serde_json::from_str(r#"{"job_id": 18}"#).unwrap();
        assert_eq!(request.job_id, 18);
        assert!(request.limit.is_none());
        assert!(request.min_compatibility.is_none());
    }
}
