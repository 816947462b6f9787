use sqlx::{FromRow, PgPool};

use crate::models::candidate::CandidateProfile;

/// One candidate × skill join row. `skill` is NULL for candidates with no
/// recorded skills (LEFT JOIN keeps them in the pool).
#[derive(Debug, FromRow)]
struct CandidateSkillJoinRow {
    id: i64,
    name: String,
    email: String,
    profile: Option<String>,
    skill: Option<String>,
}

const CANDIDATE_POOL_QUERY: &str = r#"
    SELECT c.id, c.name, c.email, c.profile, s.name AS skill
    FROM candidates c
    LEFT JOIN candidate_skills cs ON cs.candidate_id = c.id
    LEFT JOIN skills s ON s.id = cs.skill_id
    ORDER BY c.id, cs.proficiency DESC NULLS LAST, s.name
"#;

/// Loads the full candidate pool with skills resolved, one profile per
/// candidate. Skill order is deterministic (proficiency desc, then name) so
/// prompt assembly downstream stays deterministic too.
pub async fn list_candidate_profiles(pool: &PgPool) -> Result<Vec<CandidateProfile>, sqlx::Error> {
    let rows: Vec<CandidateSkillJoinRow> = sqlx::query_as(CANDIDATE_POOL_QUERY)
        .fetch_all(pool)
        .await?;

    Ok(fold_join_rows(rows))
}

/// Loads a single candidate with skills, or None if the id is unknown.
pub async fn get_candidate_profile(
    pool: &PgPool,
    candidate_id: i64,
) -> Result<Option<CandidateProfile>, sqlx::Error> {
    let rows: Vec<CandidateSkillJoinRow> = sqlx::query_as(
        r#"
        SELECT c.id, c.name, c.email, c.profile, s.name AS skill
        FROM candidates c
        LEFT JOIN candidate_skills cs ON cs.candidate_id = c.id
        LEFT JOIN skills s ON s.id = cs.skill_id
        WHERE c.id = $1
        ORDER BY cs.proficiency DESC NULLS LAST, s.name
        "#,
    )
    .bind(candidate_id)
    .fetch_all(pool)
    .await?;

    Ok(fold_join_rows(rows).into_iter().next())
}

/// Collapses join rows into profiles. Rows arrive grouped by candidate id.
fn fold_join_rows(rows: Vec<CandidateSkillJoinRow>) -> Vec<CandidateProfile> {
    let mut profiles: Vec<CandidateProfile> = Vec::new();

    for row in rows {
        match profiles.last_mut() {
            Some(current) if current.id == row.id => {
                if let Some(skill) = row.skill {
                    current.skills.push(skill);
                }
            }
            _ => {
                let mut skills = Vec::new();
                if let Some(skill) = row.skill {
                    skills.push(skill);
                }
                profiles.push(CandidateProfile {
                    id: row.id,
                    name: row.name,
                    email: row.email,
                    profile: row.profile.unwrap_or_default(),
                    skills,
                });
            }
        }
    }

    profiles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, name: &str, skill: Option<&str>) -> CandidateSkillJoinRow {
        CandidateSkillJoinRow {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            profile: Some(format!("{name} profile")),
            skill: skill.map(str::to_string),
        }
    }

    #[test]
    fn test_fold_groups_skills_per_candidate() {
        let rows = vec![
            row(1, "Ana", Some("Rust")),
            row(1, "Ana", Some("SQL")),
            row(2, "Bruno", Some("Python")),
        ];
        let profiles = fold_join_rows(rows);
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].skills, vec!["Rust", "SQL"]);
        assert_eq!(profiles[1].skills, vec!["Python"]);
    }

    #[test]
    fn test_fold_keeps_candidates_without_skills() {
        let rows = vec![row(1, "Ana", None), row(2, "Bruno", Some("Go"))];
        let profiles = fold_join_rows(rows);
        assert_eq!(profiles.len(), 2);
        assert!(profiles[0].skills.is_empty());
    }

    #[test]
    fn test_fold_defaults_missing_profile_to_empty() {
        let mut r = row(1, "Ana", None);
        r.profile = None;
        let profiles = fold_join_rows(vec![r]);
        assert_eq!(profiles[0].profile, "");
    }
}
