use serde::Serialize;

/// A candidate with their skills resolved, the unit the ranking pipeline
/// operates on. Read-only from the pipeline's perspective.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub profile: String,
    /// Skill names ordered by proficiency descending, then name.
    pub skills: Vec<String>,
}
