//! Candidate scoring and deterministic per-job ranking.

pub mod domain;
pub mod experience;
pub mod ranker;
pub mod skills;

pub use domain::{
    Application, ApplicationStatus, Candidate, CandidateId, Job, JobId, RankedCandidate,
    ScoreBreakdown, ScoreWeights,
};
pub use experience::{ExperienceScoreError, ExperienceScoring, LinearExperienceScorer};
pub use ranker::{apply_rankings, CandidateRanker, RankingError};
pub use skills::{normalize_skill, SkillMatch, SkillMatchMode, SkillMatcher};
