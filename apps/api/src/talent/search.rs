//! Talent-pool search prompts. The free-text query is framed as a virtual
//! job requirement and scored through the same engine/parser chain as
//! ranking, with "relevance to query" semantics.

use crate::models::candidate::CandidateProfile;

/// Search calls run colder than analysis: extraction over creativity.
pub const SEARCH_TEMPERATURE: f32 = 0.3;

/// System prompt for talent search. Enforces JSON-only output.
pub const SEARCH_SYSTEM: &str =
    "You are a recruiting assistant matching candidates against a hiring \
    manager's free-text search. Score how relevant each candidate is to the \
    search, not general candidate quality. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Search prompt template. Replace {query} and {candidate_*} before sending.
pub const SEARCH_PROMPT_TEMPLATE: &str = r#"A recruiter is searching the talent pool with this query:
"{query}"

Treat the query as the requirements of a virtual job opening (skills,
seniority, role, anything else it mentions) and rate how relevant this
candidate is to it.

CANDIDATE:
- Name: {candidate_name}
- Skills: {candidate_skills}
- Profile: {candidate_profile}

Return a JSON object with this EXACT schema (no extra fields):
{
  "compatibility_score": 0-100 relevance of the candidate to the query,
  "cultural_fit_score": 0,
  "professional_fit_score": 0-100 skill overlap with the query,
  "analysis": "1-2 sentences on why this candidate matches or not",
  "red_flags": ["mismatch with the query", ...],
  "strengths": [],
  "recommendation": "RECOMENDADO" | "EM_ANALISE" | "NAO_RECOMENDADO",
  "suggested_questions": []
}

All scores are numbers between 0 and 100."#;

/// Builds the relevance prompt for one candidate against a search query.
/// Pure function of its inputs.
pub fn build_search_prompt(query: &str, candidate: &CandidateProfile) -> String {
    let candidate_skills = if candidate.skills.is_empty() {
        "none listed".to_string()
    } else {
        candidate.skills.join(", ")
    };

    SEARCH_PROMPT_TEMPLATE
        .replace("{query}", query)
        .replace("{candidate_name}", &candidate.name)
        .replace("{candidate_skills}", &candidate_skills)
        .replace(
            "{candidate_profile}",
            if candidate.profile.is_empty() {
                "not provided"
            } else {
                &candidate.profile
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_candidate() -> CandidateProfile {
        CandidateProfile {
            id: 11,
            name: "Marcos Lima".to_string(),
            email: "marcos@example.com".to_string(),
            profile: "Data engineer, Spark and Airflow.".to_string(),
            skills: vec!["Python".to_string(), "Spark".to_string()],
        }
    }

    #[test]
    fn test_search_prompt_embeds_query_and_candidate() {
        let prompt = build_search_prompt("senior Python data engineer", &sample_candidate());
        assert!(prompt.contains("senior Python data engineer"));
        assert!(prompt.contains("Marcos Lima"));
        assert!(prompt.contains("Python, Spark"));
    }

    #[test]
    fn test_search_prompt_is_deterministic() {
        let a = build_search_prompt("rust dev", &sample_candidate());
        let b = build_search_prompt("rust dev", &sample_candidate());
        assert_eq!(a, b);
    }

    #[test]
    fn test_search_prompt_leaves_no_placeholders() {
        let mut candidate = sample_candidate();
        candidate.skills.clear();
        candidate.profile.clear();
        let prompt = build_search_prompt("anyone", &candidate);
        assert!(!prompt.contains("{query}"));
        assert!(!prompt.contains("{candidate_"));
        assert!(prompt.contains("none listed"));
        assert!(prompt.contains("not provided"));
    }
}
