/// Rejected inputs for an experience scorer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExperienceScoreError {
    #[error("years of experience must be finite and non-negative, found {0}")]
    InvalidYears(f64),
    #[error("expected experience years must be finite and non-negative, found {0}")]
    InvalidExpected(f64),
}

/// Maps years of experience into a 0-100 score.
///
/// Swappable so the ranker does not depend on a particular formula.
pub trait ExperienceScoring: Send + Sync {
    fn score(&self, years_experience: f64, expected_years: f64) -> Result<u8, ExperienceScoreError>;
}

/// `clamp(0, 100, round(100 * years / expected))`; an expected value of zero scores 100.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearExperienceScorer;

impl ExperienceScoring for LinearExperienceScorer {
    fn score(&self, years_experience: f64, expected_years: f64) -> Result<u8, ExperienceScoreError> {
        if !years_experience.is_finite() || years_experience < 0.0 {
            return Err(ExperienceScoreError::InvalidYears(years_experience));
        }
        if !expected_years.is_finite() || expected_years < 0.0 {
            return Err(ExperienceScoreError::InvalidExpected(expected_years));
        }
        if expected_years == 0.0 {
            return Ok(100);
        }

        let ratio = (100.0 * years_experience / expected_years).round();
        Ok(ratio.clamp(0.0, 100.0) as u8)
    }
}
