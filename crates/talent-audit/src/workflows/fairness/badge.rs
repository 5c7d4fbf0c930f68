use serde::{Deserialize, Serialize};

use super::domain::{Severity, Violation};

/// Points deducted from a perfect score per violation severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyWeights {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl PenaltyWeights {
    pub const fn penalty(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            critical: 40,
            high: 25,
            medium: 15,
            low: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub const fn from_score(score: u32) -> Self {
        match score {
            90.. => Grade::APlus,
            80..=89 => Grade::A,
            70..=79 => Grade::B,
            60..=69 => Grade::C,
            50..=59 => Grade::D,
            _ => Grade::F,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    pub const fn level(self) -> &'static str {
        match self {
            Grade::APlus => "Excellent Fairness",
            Grade::A => "Good Fairness",
            Grade::B => "Minor Concerns",
            Grade::C => "Fair Concerns",
            Grade::D => "Significant Bias",
            Grade::F => "Critical Bias",
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Grade::APlus => "#15803d",
            Grade::A => "#22c55e",
            Grade::B => "#84cc16",
            Grade::C => "#eab308",
            Grade::D => "#f97316",
            Grade::F => "#dc2626",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FairnessBadge {
    pub grade: Grade,
    pub score: u32,
    pub level: String,
    pub color: String,
}

/// Turns violation severities into a score and letter grade.
///
/// Only severities are consulted, never metric identities.
#[derive(Debug, Clone, Copy, Default)]
pub struct FairnessBadgeGrader {
    penalties: PenaltyWeights,
}

impl FairnessBadgeGrader {
    pub fn new(penalties: PenaltyWeights) -> Self {
        Self { penalties }
    }

    pub fn grade(&self, violations: &[Violation]) -> FairnessBadge {
        self.grade_severities(violations.iter().map(|violation| violation.severity))
    }

    pub fn grade_severities(&self, severities: impl IntoIterator<Item = Severity>) -> FairnessBadge {
        let deducted = severities
            .into_iter()
            .map(|severity| self.penalties.penalty(severity))
            .fold(0u32, u32::saturating_add);
        let score = 100u32.saturating_sub(deducted);
        let grade = Grade::from_score(score);

        FairnessBadge {
            grade,
            score,
            level: grade.level().to_string(),
            color: grade.color().to_string(),
        }
    }
}
