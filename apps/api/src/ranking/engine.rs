//! Ranking engine: bounded-concurrency fan-out of model calls over a
//! candidate pool, with deterministic collect-then-sort ordering.
//!
//! One model call per candidate dominates latency, so calls run concurrently
//! under a semaphore. Output order comes only from the final sort (score
//! descending, candidate id ascending on ties), never from completion order.

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::ChatModel;
use crate::models::analysis::RankedCandidate;
use crate::models::candidate::CandidateProfile;
use crate::ranking::parser::parse_analysis;

/// Which candidates enter the ranking pool. Kept configurable because the
/// right policy differs per deployment: small pools rank everyone, large
/// pools skip candidates who have not recorded a single skill yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityPolicy {
    /// Every registered candidate is scored.
    All,
    /// Only candidates with at least one recorded skill are scored.
    WithSkills,
}

impl EligibilityPolicy {
    pub fn apply(&self, candidates: Vec<CandidateProfile>) -> Vec<CandidateProfile> {
        match self {
            EligibilityPolicy::All => candidates,
            EligibilityPolicy::WithSkills => candidates
                .into_iter()
                .filter(|c| !c.skills.is_empty())
                .collect(),
        }
    }
}

impl FromStr for EligibilityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(EligibilityPolicy::All),
            "with-skills" => Ok(EligibilityPolicy::WithSkills),
            other => Err(format!(
                "Unknown eligibility policy '{other}' (expected 'all' or 'with-skills')"
            )),
        }
    }
}

/// Filter/sort/truncate parameters for one ranking run.
#[derive(Debug, Clone)]
pub struct RankingOptions {
    pub limit: usize,
    pub min_score: f64,
    pub concurrency: usize,
}

/// Scores every candidate in the pool against a prompt, then filters, sorts,
/// and truncates. The prompt builder runs up front so the fan-out tasks own
/// plain strings.
///
/// Failure policy: a transport failure for one candidate excludes that
/// candidate and logs a warning; an auth failure aborts the whole run
/// (the credential is broken for everyone). Returning early drops the
/// `JoinSet`, which aborts all in-flight calls.
pub async fn score_pool<F>(
    model: Arc<dyn ChatModel>,
    candidates: Vec<CandidateProfile>,
    build_prompt: F,
    system: &'static str,
    temperature: f32,
    opts: &RankingOptions,
) -> Result<Vec<RankedCandidate>, AppError>
where
    F: Fn(&CandidateProfile) -> String,
{
    let semaphore = Arc::new(Semaphore::new(opts.concurrency.max(1)));
    let mut tasks: JoinSet<(CandidateProfile, Result<String, crate::llm_client::LlmError>)> =
        JoinSet::new();

    for candidate in candidates {
        let prompt = build_prompt(&candidate);
        let model = Arc::clone(&model);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            let outcome = model.complete(&prompt, system, temperature).await;
            (candidate, outcome)
        });
    }

    let mut scored = Vec::new();

    while let Some(joined) = tasks.join_next().await {
        let (candidate, outcome) = joined
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Scoring task panicked: {e}")))?;

        match outcome {
            Ok(text) => {
                let analysis = parse_analysis(&text);
                scored.push(RankedCandidate::new(&candidate, analysis));
            }
            Err(e) if e.is_auth() => return Err(AppError::ModelAuth(e.to_string())),
            Err(e) => {
                warn!(
                    "Excluding candidate {} ({}) from ranking: {e}",
                    candidate.id, candidate.name
                );
            }
        }
    }

    scored.retain(|c| c.compatibility_score >= opts.min_score);
    scored.sort_by(compare_ranked);
    scored.truncate(opts.limit);

    Ok(scored)
}

/// Score descending; ties broken by candidate id ascending so equal scores
/// always come back in the same order.
fn compare_ranked(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    b.compatibility_score
        .partial_cmp(&a.compatibility_score)
        .unwrap_or(Ordering::Equal)
        .then(a.candidate_id.cmp(&b.candidate_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    use crate::llm_client::LlmError;
    use crate::models::analysis::Recommendation;

    /// Scripted model: maps candidate name (embedded in the prompt) to a
    /// canned reply or failure.
    struct FakeModel {
        replies: HashMap<String, Result<String, u16>>,
    }

    impl FakeModel {
        fn scored(pairs: &[(&str, f64)]) -> Self {
            let replies = pairs
                .iter()
                .map(|(name, score)| {
                    (
                        name.to_string(),
                        Ok(format!(
                            r#"{{"compatibility_score": {score}, "recommendation": "EM_ANALISE"}}"#
                        )),
                    )
                })
                .collect();
            Self { replies }
        }

        fn failing(mut self, name: &str, status: u16) -> Self {
            self.replies.insert(name.to_string(), Err(status));
            self
        }
    }

    #[async_trait]
    impl ChatModel for FakeModel {
        async fn complete(
            &self,
            prompt: &str,
            _system: &str,
            _temperature: f32,
        ) -> Result<String, LlmError> {
            for (name, reply) in &self.replies {
                if prompt.contains(name.as_str()) {
                    return match reply {
                        Ok(text) => Ok(text.clone()),
                        Err(401) => Err(LlmError::Auth {
                            status: 401,
                            message: "bad key".to_string(),
                        }),
                        Err(status) => Err(LlmError::Api {
                            status: *status,
                            message: "boom".to_string(),
                        }),
                    };
                }
            }
            Ok(r#"{"compatibility_score": 0}"#.to_string())
        }
    }

    fn candidate(id: i64, name: &str) -> CandidateProfile {
        CandidateProfile {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            profile: String::new(),
            skills: vec!["Rust".to_string()],
        }
    }

    fn name_prompt(c: &CandidateProfile) -> String {
        format!("Candidate: {}", c.name)
    }

    fn opts(limit: usize, min_score: f64) -> RankingOptions {
        RankingOptions {
            limit,
            min_score,
            concurrency: 4,
        }
    }

    #[tokio::test]
    async fn test_filter_sort_truncate_scenario() {
        // Pool scores [70, 45, 82, 50, 30], min 50, limit 5 → [82, 70, 50].
        let model = Arc::new(FakeModel::scored(&[
            ("Alice", 70.0),
            ("Bruno", 45.0),
            ("Carla", 82.0),
            ("Diego", 50.0),
            ("Elisa", 30.0),
        ]));
        let pool = vec![
            candidate(1, "Alice"),
            candidate(2, "Bruno"),
            candidate(3, "Carla"),
            candidate(4, "Diego"),
            candidate(5, "Elisa"),
        ];

        let ranked = score_pool(model, pool, name_prompt, "system", 0.0, &opts(5, 50.0))
            .await
            .unwrap();

        let scores: Vec<f64> = ranked.iter().map(|c| c.compatibility_score).collect();
        assert_eq!(scores, vec![82.0, 70.0, 50.0]);
        assert_eq!(ranked.len(), 3);
    }

    #[tokio::test]
    async fn test_ties_break_by_candidate_id_ascending() {
        let model = Arc::new(FakeModel::scored(&[
            ("Alice", 80.0),
            ("Bruno", 80.0),
            ("Carla", 80.0),
        ]));
        // Insert out of id order to prove completion/input order is irrelevant.
        let pool = vec![
            candidate(9, "Carla"),
            candidate(2, "Alice"),
            candidate(5, "Bruno"),
        ];

        let ranked = score_pool(model, pool, name_prompt, "system", 0.0, &opts(10, 0.0))
            .await
            .unwrap();

        let ids: Vec<i64> = ranked.iter().map(|c| c.candidate_id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[tokio::test]
    async fn test_limit_truncates_output() {
        let model = Arc::new(FakeModel::scored(&[
            ("Alice", 90.0),
            ("Bruno", 80.0),
            ("Carla", 70.0),
        ]));
        let pool = vec![
            candidate(1, "Alice"),
            candidate(2, "Bruno"),
            candidate(3, "Carla"),
        ];

        let ranked = score_pool(model, pool, name_prompt, "system", 0.0, &opts(2, 0.0))
            .await
            .unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].compatibility_score, 90.0);
    }

    #[tokio::test]
    async fn test_one_transport_failure_excludes_only_that_candidate() {
        let mut pairs = Vec::new();
        let names = [
            "Alice", "Bruno", "Carla", "Diego", "Elisa", "Fabio", "Gina", "Hugo", "Iara", "Joao",
        ];
        for name in names {
            pairs.push((name, 60.0));
        }
        let model = Arc::new(FakeModel::scored(&pairs).failing("Diego", 503));
        let pool: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, name)| candidate(i as i64 + 1, name))
            .collect();

        let ranked = score_pool(model, pool, name_prompt, "system", 0.0, &opts(20, 0.0))
            .await
            .unwrap();

        assert_eq!(ranked.len(), 9);
        assert!(ranked.iter().all(|c| c.candidate_name != "Diego"));
    }

    #[tokio::test]
    async fn test_auth_failure_aborts_whole_ranking() {
        let model = Arc::new(FakeModel::scored(&[("Alice", 60.0)]).failing("Bruno", 401));
        let pool = vec![candidate(1, "Alice"), candidate(2, "Bruno")];

        let result = score_pool(model, pool, name_prompt, "system", 0.0, &opts(10, 0.0)).await;

        assert!(matches!(result, Err(AppError::ModelAuth(_))));
    }

    #[tokio::test]
    async fn test_empty_pool_returns_empty_list() {
        let model = Arc::new(FakeModel::scored(&[]));
        let ranked = score_pool(model, vec![], name_prompt, "system", 0.0, &opts(10, 0.0))
            .await
            .unwrap();
        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_reply_degrades_instead_of_failing() {
        let mut model = FakeModel::scored(&[("Alice", 70.0)]);
        model.replies.insert(
            "Bruno".to_string(),
            Ok("I think this candidate is great, maybe 85%?".to_string()),
        );
        let pool = vec![candidate(1, "Alice"), candidate(2, "Bruno")];

        let ranked = score_pool(
            Arc::new(model),
            pool,
            name_prompt,
            "system",
            0.0,
            &opts(10, 0.0),
        )
        .await
        .unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].candidate_name, "Bruno");
        assert_eq!(ranked[0].compatibility_score, 85.0);
        assert_eq!(ranked[0].recommendation, Recommendation::EmAnalise);
    }

    #[test]
    fn test_eligibility_with_skills_drops_skill_less_candidates() {
        let mut no_skills = candidate(1, "Alice");
        no_skills.skills.clear();
        let pool = vec![no_skills, candidate(2, "Bruno")];

        let kept = EligibilityPolicy::WithSkills.apply(pool.clone());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 2);

        let all = EligibilityPolicy::All.apply(pool);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_eligibility_policy_parses_from_config_values() {
        assert_eq!(
            "all".parse::<EligibilityPolicy>().unwrap(),
            EligibilityPolicy::All
        );
        assert_eq!(
            "with-skills".parse::<EligibilityPolicy>().unwrap(),
            EligibilityPolicy::WithSkills
        );
        assert!("everything".parse::<EligibilityPolicy>().is_err());
    }
}
