use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub salary: Option<f64>,
    pub seniority: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A skill a job asks for, with its importance weighting.
#[derive(Debug, Clone, Serialize)]
pub struct JobSkill {
    pub name: String,
    pub required: bool,
}

/// A job with its required skills resolved. Read-only from the ranking
/// pipeline's perspective.
#[derive(Debug, Clone, Serialize)]
pub struct JobProfile {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub salary: Option<f64>,
    pub seniority: String,
    pub skills: Vec<JobSkill>,
}
