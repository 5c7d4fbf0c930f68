use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for candidates supplied by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Immutable candidate snapshot handed to a single ranking call.
///
/// Skills arrive already extracted from the resume. Missing skills or experience
/// degrade the matching score to zero instead of failing the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub years_experience: Option<f64>,
    #[serde(default)]
    pub education: String,
    pub applied_at: DateTime<Utc>,
}

/// Job posting requirements used to score candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub expected_experience_years: Option<f64>,
    #[serde(default)]
    pub weights: Option<ScoreWeights>,
}

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Relative contribution of skills and experience to the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub skill_weight: f64,
    pub experience_weight: f64,
}

impl ScoreWeights {
    /// Weights must be finite, non-negative, and sum to 1.0.
    pub fn is_valid(&self) -> bool {
        let finite = self.skill_weight.is_finite() && self.experience_weight.is_finite();
        let non_negative = self.skill_weight >= 0.0 && self.experience_weight >= 0.0;
        finite
            && non_negative
            && (self.skill_weight + self.experience_weight - 1.0).abs() <= WEIGHT_TOLERANCE
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            skill_weight: 0.6,
            experience_weight: 0.4,
        }
    }
}

/// Pipeline status owned by the surrounding CRUD layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Shortlisted,
    Interviewed,
    Hired,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Interviewed => "interviewed",
            ApplicationStatus::Hired => "hired",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

/// Score fields written back onto an application after a ranking run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skill_score: u8,
    pub experience_score: u8,
    pub overall_score: f64,
}

/// A candidate's application to one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub candidate_id: CandidateId,
    pub job_id: JobId,
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<ScoreBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

/// One row of a ranking run, as exposed to the API and UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub candidate_id: CandidateId,
    pub rank: u32,
    pub skill_match_score: u8,
    pub experience_score: u8,
    pub overall_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

impl RankedCandidate {
    pub fn breakdown(&self) -> ScoreBreakdown {
        ScoreBreakdown {
            skill_score: self.skill_match_score,
            experience_score: self.experience_score,
            overall_score: self.overall_score,
        }
    }
}
