use sqlx::PgPool;

use crate::models::analysis::{AnalysisResultRow, CandidateAnalysis};

/// Persists one analysis outcome for later review. `job_id` is NULL for
/// talent-pool search scores. Returns the new row id.
pub async fn insert_analysis_result(
    pool: &PgPool,
    candidate_id: i64,
    job_id: Option<i64>,
    analysis: &CandidateAnalysis,
) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO analysis_results
            (candidate_id, job_id, compatibility_score, cultural_fit_score,
             professional_fit_score, analysis, red_flags, recommendation)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(candidate_id)
    .bind(job_id)
    .bind(analysis.compatibility_score)
    .bind(analysis.cultural_fit_score)
    .bind(analysis.professional_fit_score)
    .bind(&analysis.analysis)
    .bind(&analysis.red_flags)
    .bind(analysis.recommendation.as_str())
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// All stored analysis results for a candidate, newest first.
pub async fn list_candidate_results(
    pool: &PgPool,
    candidate_id: i64,
) -> Result<Vec<AnalysisResultRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, candidate_id, job_id, compatibility_score, cultural_fit_score,
               professional_fit_score, analysis, red_flags, recommendation, created_at
        FROM analysis_results
        WHERE candidate_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(candidate_id)
    .fetch_all(pool)
    .await
}
