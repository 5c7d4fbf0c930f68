use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// How a candidate skill is compared with a required skill.
///
/// `FuzzySubstring` accepts either string containing the other, so "java" and
/// "javascript" match. `Exact` requires equal normalized strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkillMatchMode {
    Exact,
    #[default]
    FuzzySubstring,
}

impl SkillMatchMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exact" => Some(Self::Exact),
            "fuzzy" | "fuzzy-substring" | "fuzzy_substring" => Some(Self::FuzzySubstring),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            SkillMatchMode::Exact => "exact",
            SkillMatchMode::FuzzySubstring => "fuzzy-substring",
        }
    }

    fn matches(self, candidate_skill: &str, required_skill: &str) -> bool {
        match self {
            SkillMatchMode::Exact => candidate_skill == required_skill,
            SkillMatchMode::FuzzySubstring => {
                candidate_skill.contains(required_skill) || required_skill.contains(candidate_skill)
            }
        }
    }
}

/// Matched and missing requirements for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillMatch {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub score: u8,
}

pub fn normalize_skill(skill: &str) -> String {
    skill.trim().to_lowercase()
}

/// Normalize, drop blanks, and dedupe while keeping first-seen order.
fn normalized_requirements(skills: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    skills
        .iter()
        .map(|skill| normalize_skill(skill))
        .filter(|skill| !skill.is_empty())
        .filter(|skill| seen.insert(skill.clone()))
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SkillMatcher {
    mode: SkillMatchMode,
}

impl SkillMatcher {
    pub fn new(mode: SkillMatchMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> SkillMatchMode {
        self.mode
    }

    /// Compare a candidate's skills with the job's requirements.
    ///
    /// An empty requirement list is vacuously satisfied and scores 100.
    pub fn match_skills(&self, candidate_skills: &[String], required_skills: &[String]) -> SkillMatch {
        let required = normalized_requirements(required_skills);
        let candidate: BTreeSet<String> = candidate_skills
            .iter()
            .map(|skill| normalize_skill(skill))
            .filter(|skill| !skill.is_empty())
            .collect();

        let (matched, missing): (Vec<String>, Vec<String>) =
            required.into_iter().partition(|requirement| {
                candidate
                    .iter()
                    .any(|skill| self.mode.matches(skill, requirement))
            });

        let total = matched.len() + missing.len();
        let score = if total == 0 {
            100
        } else {
            (100.0 * matched.len() as f64 / total as f64).round() as u8
        };

        SkillMatch {
            matched,
            missing,
            score,
        }
    }
}
