use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::candidate::CandidateProfile;

/// Closed set of outcome labels the model is instructed to choose from.
/// Anything else the model emits is fuzzy-mapped in the parser; `EmAnalise`
/// is the fallback when no label can be recognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "RECOMENDADO")]
    Recomendado,
    #[default]
    #[serde(rename = "EM_ANALISE")]
    EmAnalise,
    #[serde(rename = "NAO_RECOMENDADO")]
    NaoRecomendado,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Recomendado => "RECOMENDADO",
            Recommendation::EmAnalise => "EM_ANALISE",
            Recommendation::NaoRecomendado => "NAO_RECOMENDADO",
        }
    }
}

/// Everything the parser extracts from one model reply. All scores are
/// guaranteed in [0, 100]; list fields default to empty; `recommendation`
/// defaults to `EmAnalise`. Never persisted by the engine itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateAnalysis {
    pub compatibility_score: f64,
    pub cultural_fit_score: f64,
    pub professional_fit_score: f64,
    pub analysis: String,
    pub red_flags: Vec<String>,
    pub strengths: Vec<String>,
    pub suggested_questions: Vec<String>,
    pub recommendation: Recommendation,
}

/// One entry of a ranking (or talent search) response.
#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub candidate_id: i64,
    pub candidate_name: String,
    pub candidate_email: String,
    pub compatibility_score: f64,
    pub cultural_fit_score: f64,
    pub professional_fit_score: f64,
    pub ai_analysis: String,
    pub red_flags: Vec<String>,
    pub recommendation: Recommendation,
}

impl RankedCandidate {
    pub fn new(candidate: &CandidateProfile, analysis: CandidateAnalysis) -> Self {
        Self {
            candidate_id: candidate.id,
            candidate_name: candidate.name.clone(),
            candidate_email: candidate.email.clone(),
            compatibility_score: analysis.compatibility_score,
            cultural_fit_score: analysis.cultural_fit_score,
            professional_fit_score: analysis.professional_fit_score,
            ai_analysis: analysis.analysis,
            red_flags: analysis.red_flags,
            recommendation: analysis.recommendation,
        }
    }
}

/// Persisted analysis history row. Written by handlers through the store
/// after a pipeline run; `job_id` is NULL for talent-pool search results.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AnalysisResultRow {
    pub id: i64,
    pub candidate_id: i64,
    pub job_id: Option<i64>,
    pub compatibility_score: f64,
    pub cultural_fit_score: f64,
    pub professional_fit_score: f64,
    pub analysis: String,
    pub red_flags: Vec<String>,
    pub recommendation: String,
    pub created_at: DateTime<Utc>,
}
