use sqlx::{FromRow, PgPool};

use crate::models::job::{JobProfile, JobRow, JobSkill};

#[derive(Debug, FromRow)]
struct JobSkillJoinRow {
    name: String,
    required: bool,
}

/// Loads a job with its required skills, or None if the id is unknown.
pub async fn get_job_profile(pool: &PgPool, job_id: i64) -> Result<Option<JobProfile>, sqlx::Error> {
    let job: Option<JobRow> = sqlx::query_as(
        "SELECT id, title, description, salary, seniority, created_at FROM jobs WHERE id = $1",
    )
    .bind(job_id)
    .fetch_optional(pool)
    .await?;

    let Some(job) = job else {
        return Ok(None);
    };

    let skills: Vec<JobSkillJoinRow> = sqlx::query_as(
        r#"
        SELECT s.name, js.required
        FROM job_skills js
        INNER JOIN skills s ON s.id = js.skill_id
        WHERE js.job_id = $1
        ORDER BY js.required DESC, s.name
        "#,
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;

    Ok(Some(JobProfile {
        id: job.id,
        title: job.title,
        description: job.description.unwrap_or_default(),
        salary: job.salary,
        seniority: job.seniority.unwrap_or_default(),
        skills: skills
            .into_iter()
            .map(|s| JobSkill {
                name: s.name,
                required: s.required,
            })
            .collect(),
    }))
}
