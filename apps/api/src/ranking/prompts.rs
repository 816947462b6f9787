// All prompt constants for the compatibility analysis pipeline.
// Talent-pool search defines its own prompts alongside its module.

use crate::models::candidate::CandidateProfile;
use crate::models::job::JobProfile;

/// Temperature for compatibility analysis calls.
pub const ANALYSIS_TEMPERATURE: f32 = 0.7;

/// System prompt for compatibility analysis. Enforces JSON-only output.
pub const ANALYSIS_SYSTEM: &str =
    "You are an expert recruiter assessing cultural and professional fit \
    between candidates and open positions. Analyze candidates objectively \
    and constructively. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Analysis prompt template. Replace {candidate_*} and {job_*} before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the compatibility between the candidate and the job opening.

CANDIDATE:
- Name: {candidate_name}
- Skills: {candidate_skills}
- Profile: {candidate_profile}

JOB OPENING:
- Title: {job_title}
- Description: {job_description}
- Required skills: {job_skills}
- Seniority: {job_seniority}
- Salary: {job_salary}

TASK:
Assess the compatibility and return a JSON object with this EXACT schema (no extra fields):
{
  "compatibility_score": 0-100 overall compatibility,
  "cultural_fit_score": 0-100 cultural fit,
  "professional_fit_score": 0-100 professional fit based on skills,
  "analysis": "detailed assessment, 2-3 paragraphs",
  "red_flags": ["concern or incompatibility", ...],
  "strengths": ["candidate strength", ...],
  "recommendation": "RECOMENDADO" | "EM_ANALISE" | "NAO_RECOMENDADO",
  "suggested_questions": ["3-5 interview questions", ...]
}

All scores are numbers between 0 and 100. `recommendation` MUST be exactly one
of the three labels above."#;

/// Builds the analysis prompt for one candidate against one job.
/// Pure function of its inputs: identical job + candidate always produce an
/// identical prompt (skill order is fixed upstream by the store).
pub fn build_analysis_prompt(job: &JobProfile, candidate: &CandidateProfile) -> String {
    let candidate_skills = if candidate.skills.is_empty() {
        "none listed".to_string()
    } else {
        candidate.skills.join(", ")
    };

    let job_skills = if job.skills.is_empty() {
        "none listed".to_string()
    } else {
        job.skills
            .iter()
            .map(|s| {
                if s.required {
                    format!("{} (required)", s.name)
                } else {
                    format!("{} (nice to have)", s.name)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    ANALYSIS_PROMPT_TEMPLATE
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
        .replace("{job_title}", &job.title)
        .replace(
            "{job_description}",
            if job.description.is_empty() {
                "not provided"
            } else {
                &job.description
            },
        )
        .replace("{job_skills}", &job_skills)
        .replace(
            "{job_seniority}",
            if job.seniority.is_empty() {
                "not specified"
            } else {
                &job.seniority
            },
        )
        .replace(
            "{job_salary}",
            &job.salary
                .map(|s| format!("{s:.2}"))
                .unwrap_or_else(|| "not specified".to_string()),
        )
}
