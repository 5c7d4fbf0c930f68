use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::domain::{Application, Candidate, CandidateId, Job, RankedCandidate, ScoreWeights};
use super::experience::{ExperienceScoreError, ExperienceScoring, LinearExperienceScorer};
use super::skills::SkillMatcher;
use crate::config::RankingConfig;

/// Validation errors raised before any candidate is ranked.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankingError {
    #[error("score weights must be non-negative and sum to 1.0 (skill {skill}, experience {experience})")]
    InvalidWeights { skill: f64, experience: f64 },
    #[error("expected experience years must be finite and non-negative, found {0}")]
    InvalidExpectedExperience(f64),
    #[error("candidate {candidate} has invalid experience: {source}")]
    InvalidExperience {
        candidate: String,
        #[source]
        source: ExperienceScoreError,
    },
    #[error("candidate {0} appears more than once in the ranking batch")]
    DuplicateCandidate(String),
}

struct ScoredCandidate<'a> {
    candidate: &'a Candidate,
    skill_match_score: u8,
    experience_score: u8,
    overall_score: f64,
    matched_skills: Vec<String>,
    missing_skills: Vec<String>,
}

/// Stateless ranker combining skill coverage and experience into one ordering.
pub struct CandidateRanker {
    matcher: SkillMatcher,
    experience: Arc<dyn ExperienceScoring>,
    config: RankingConfig,
}

impl CandidateRanker {
    pub fn new(config: RankingConfig) -> Self {
        Self::with_experience_scorer(config, Arc::new(LinearExperienceScorer))
    }

    pub fn with_experience_scorer(
        config: RankingConfig,
        experience: Arc<dyn ExperienceScoring>,
    ) -> Self {
        Self {
            matcher: SkillMatcher::new(config.match_mode),
            experience,
            config,
        }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Weights resolve as explicit override, then the job's own weights, then the default.
    pub fn resolve_weights(&self, job: &Job, weights: Option<ScoreWeights>) -> ScoreWeights {
        weights
            .or(job.weights)
            .unwrap_or(self.config.default_weights)
    }

    /// Score and order candidates for a job.
    ///
    /// Ranks run 1..=N with no gaps. Ties on the overall score go to the earlier
    /// application, then to the lexicographically smaller candidate id.
    pub fn rank(
        &self,
        job: &Job,
        candidates: &[Candidate],
        weights: Option<ScoreWeights>,
    ) -> Result<Vec<RankedCandidate>, RankingError> {
        let weights = self.resolve_weights(job, weights);
        if !weights.is_valid() {
            return Err(RankingError::InvalidWeights {
                skill: weights.skill_weight,
                experience: weights.experience_weight,
            });
        }

        let expected_years = job
            .expected_experience_years
            .unwrap_or(self.config.default_expected_experience_years);
        if !expected_years.is_finite() || expected_years < 0.0 {
            return Err(RankingError::InvalidExpectedExperience(expected_years));
        }

        let mut seen = BTreeSet::new();
        for candidate in candidates {
            if !seen.insert(&candidate.id) {
                return Err(RankingError::DuplicateCandidate(candidate.id.0.clone()));
            }
        }

        let mut scored = candidates
            .iter()
            .map(|candidate| self.score_candidate(job, candidate, expected_years, weights))
            .collect::<Result<Vec<_>, _>>()?;

        scored.sort_by(compare_scored);

        Ok(scored
            .into_iter()
            .enumerate()
            .map(|(index, entry)| RankedCandidate {
                candidate_id: entry.candidate.id.clone(),
                rank: index as u32 + 1,
                skill_match_score: entry.skill_match_score,
                experience_score: entry.experience_score,
                overall_score: entry.overall_score,
                matched_skills: entry.matched_skills,
                missing_skills: entry.missing_skills,
            })
            .collect())
    }

    fn score_candidate<'a>(
        &self,
        job: &Job,
        candidate: &'a Candidate,
        expected_years: f64,
        weights: ScoreWeights,
    ) -> Result<ScoredCandidate<'a>, RankingError> {
        let skills = self
            .matcher
            .match_skills(&candidate.skills, &job.required_skills);

        let skill_match_score = skills.score;

        let experience_score = match candidate.years_experience {
            Some(years) => self
                .experience
                .score(years, expected_years)
                .map_err(|source| RankingError::InvalidExperience {
                    candidate: candidate.id.0.clone(),
                    source,
                })?,
            None => 0,
        };

        let overall = weights.skill_weight * f64::from(skill_match_score)
            + weights.experience_weight * f64::from(experience_score);

        Ok(ScoredCandidate {
            candidate,
            skill_match_score,
            experience_score,
            overall_score: round_to_tenth(overall),
            matched_skills: skills.matched,
            missing_skills: skills.missing,
        })
    }
}

fn round_to_tenth(value: f64) -> f64 {
    ((value * 10.0).round() / 10.0).clamp(0.0, 100.0)
}

fn compare_scored(left: &ScoredCandidate<'_>, right: &ScoredCandidate<'_>) -> Ordering {
    right
        .overall_score
        .total_cmp(&left.overall_score)
        .then_with(|| left.candidate.applied_at.cmp(&right.candidate.applied_at))
        .then_with(|| left.candidate.id.cmp(&right.candidate.id))
}

/// Copy rank and score breakdown onto the job's applications.
///
/// Returns fresh values. Applications for other jobs are untouched; applications for
/// this job whose candidate is absent from `rankings` lose any earlier rank and scores.
pub fn apply_rankings(applications: &[Application], job: &Job, rankings: &[RankedCandidate]) -> Vec<Application> {
    let by_candidate: HashMap<&CandidateId, &RankedCandidate> = rankings
        .iter()
        .map(|ranked| (&ranked.candidate_id, ranked))
        .collect();

    applications
        .iter()
        .map(|application| {
            let mut updated = application.clone();
            if application.job_id == job.id {
                let ranked = by_candidate.get(&application.candidate_id);
                updated.rank = ranked.map(|ranked| ranked.rank);
                updated.scores = ranked.map(|ranked| ranked.breakdown());
            }
            updated
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::ranking::domain::{ApplicationStatus, JobId};
    use crate::workflows::ranking::skills::SkillMatchMode;
    use chrono::{TimeZone, Utc};

    fn job(required: &[&str]) -> Job {
        Job {
            id: JobId("job-1".to_string()),
            required_skills: required.iter().map(|skill| skill.to_string()).collect(),
            expected_experience_years: Some(5.0),
            weights: None,
        }
    }

    fn candidate(id: &str, skills: &[&str], years: Option<f64>, day: u32) -> Candidate {
        Candidate {
            id: CandidateId(id.to_string()),
            skills: skills.iter().map(|skill| skill.to_string()).collect(),
            years_experience: years,
            education: "BSc".to_string(),
            applied_at: Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap(),
        }
    }

    fn ranker() -> CandidateRanker {
        CandidateRanker::new(RankingConfig::default())
    }

    #[test]
    fn combines_weighted_scores_and_orders_descending() {
        let job = job(&["rust", "sql"]);
        let candidates = vec![
            candidate("c-1", &["rust"], Some(5.0), 1),
            candidate("c-2", &["rust", "sql"], Some(2.5), 2),
        ];

        let ranked = ranker().rank(&job, &candidates, None).expect("ranking succeeds");

        assert_eq!(ranked[0].candidate_id.0, "c-2");
        assert_eq!(ranked[0].overall_score, 80.0);
        assert_eq!(ranked[1].candidate_id.0, "c-1");
        assert_eq!(ranked[1].overall_score, 70.0);
        assert_eq!(ranked[1].missing_skills, vec!["sql".to_string()]);
    }

    #[test]
    fn ties_prefer_earlier_application_then_smaller_id() {
        let job = job(&["rust"]);
        let candidates = vec![
            candidate("c-b", &["rust"], Some(5.0), 3),
            candidate("c-c", &["rust"], Some(5.0), 2),
            candidate("c-a", &["rust"], Some(5.0), 3),
        ];

        let ranked = ranker().rank(&job, &candidates, None).expect("ranking succeeds");
        let order: Vec<&str> = ranked.iter().map(|entry| entry.candidate_id.0.as_str()).collect();
        assert_eq!(order, vec!["c-c", "c-a", "c-b"]);
        let ranks: Vec<u32> = ranked.iter().map(|entry| entry.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn missing_fields_degrade_to_zero() {
        let job = job(&["rust"]);
        let candidates = vec![candidate("c-empty", &[], None, 1)];

        let ranked = ranker().rank(&job, &candidates, None).expect("ranking succeeds");
        assert_eq!(ranked[0].skill_match_score, 0);
        assert_eq!(ranked[0].experience_score, 0);
        assert_eq!(ranked[0].overall_score, 0.0);
        assert_eq!(ranked[0].rank, 1);
    }

    #[test]
    fn explicit_weights_override_job_weights() {
        let mut job = job(&["rust"]);
        job.weights = Some(ScoreWeights {
            skill_weight: 0.0,
            experience_weight: 1.0,
        });
        let candidates = vec![candidate("c-1", &["rust"], Some(1.0), 1)];

        let from_job = ranker().rank(&job, &candidates, None).expect("job weights");
        assert_eq!(from_job[0].overall_score, 20.0);

        let explicit = ranker()
            .rank(
                &job,
                &candidates,
                Some(ScoreWeights {
                    skill_weight: 1.0,
                    experience_weight: 0.0,
                }),
            )
            .expect("explicit weights");
        assert_eq!(explicit[0].overall_score, 100.0);
    }

    #[test]
    fn rejects_invalid_weights_and_duplicates() {
        let job = job(&["rust"]);
        let candidates = vec![candidate("c-1", &["rust"], Some(1.0), 1)];
        let result = ranker().rank(
            &job,
            &candidates,
            Some(ScoreWeights {
                skill_weight: 0.5,
                experience_weight: 0.6,
            }),
        );
        assert!(matches!(result, Err(RankingError::InvalidWeights { .. })));

        let duplicated = vec![
            candidate("c-1", &["rust"], Some(1.0), 1),
            candidate("c-1", &["go"], Some(2.0), 2),
        ];
        assert_eq!(
            ranker().rank(&job, &duplicated, None),
            Err(RankingError::DuplicateCandidate("c-1".to_string()))
        );
    }

    #[test]
    fn rejects_negative_experience() {
        let job = job(&["rust"]);
        let candidates = vec![candidate("c-neg", &["rust"], Some(-2.0), 1)];
        match ranker().rank(&job, &candidates, None) {
            Err(RankingError::InvalidExperience { candidate, .. }) => assert_eq!(candidate, "c-neg"),
            other => panic!("expected invalid experience, got {other:?}"),
        }
    }

    #[test]
    fn exact_mode_changes_java_match() {
        let config = RankingConfig {
            match_mode: SkillMatchMode::Exact,
            ..RankingConfig::default()
        };
        let job = job(&["java"]);
        let candidates = vec![candidate("c-js", &["javascript"], Some(5.0), 1)];

        let fuzzy = ranker().rank(&job, &candidates, None).expect("fuzzy");
        let exact = CandidateRanker::new(config)
            .rank(&job, &candidates, None)
            .expect("exact");
        assert_eq!(fuzzy[0].skill_match_score, 100);
        assert_eq!(exact[0].skill_match_score, 0);
    }

    #[test]
    fn apply_rankings_only_touches_the_ranked_job() {
        let job = job(&["rust"]);
        let candidates = vec![candidate("c-1", &["rust"], Some(5.0), 1)];
        let ranked = ranker().rank(&job, &candidates, None).expect("ranking succeeds");

        let applications = vec![
            Application {
                candidate_id: CandidateId("c-1".to_string()),
                job_id: JobId("job-1".to_string()),
                status: ApplicationStatus::Pending,
                scores: None,
                rank: None,
            },
            Application {
                candidate_id: CandidateId("c-1".to_string()),
                job_id: JobId("job-2".to_string()),
                status: ApplicationStatus::Shortlisted,
                scores: None,
                rank: None,
            },
        ];

        let updated = apply_rankings(&applications, &job, &ranked);
        assert_eq!(updated[0].rank, Some(1));
        assert_eq!(updated[0].scores.map(|scores| scores.overall_score), Some(100.0));
        assert_eq!(updated[1].rank, None);
        assert_eq!(applications[0].rank, None, "input is left untouched");
    }

    #[test]
    fn reranking_a_different_batch_clears_stale_ranks() {
        let job = job(&["rust"]);
        let application = |id: &str| Application {
            candidate_id: CandidateId(id.to_string()),
            job_id: JobId("job-1".to_string()),
            status: ApplicationStatus::Pending,
            scores: None,
            rank: None,
        };
        let applications = vec![application("a"), application("b")];

        let first = ranker()
            .rank(&job, &[candidate("a", &["rust"], Some(5.0), 1)], None)
            .expect("first run");
        let after_first = apply_rankings(&applications, &job, &first);
        assert_eq!(after_first[0].rank, Some(1));
        assert_eq!(after_first[1].rank, None);

        let second = ranker()
            .rank(&job, &[candidate("b", &["rust"], Some(5.0), 2)], None)
            .expect("second run");
        let after_second = apply_rankings(&after_first, &job, &second);
        let ranks: Vec<Option<u32>> = after_second.iter().map(|app| app.rank).collect();
        assert_eq!(ranks, vec![None, Some(1)]);
        assert!(after_second[0].scores.is_none());
        assert!(after_second[1].scores.is_some());
    }
}
