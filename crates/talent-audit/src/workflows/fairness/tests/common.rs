use crate::workflows::fairness::domain::{DecisionRecord, GroupConfig};
use crate::workflows::fairness::report::FairnessAuditor;

pub(super) fn repeat(group: &str, decision: u8, ground_truth: u8, count: usize) -> Vec<DecisionRecord> {
    (0..count)
        .map(|_| DecisionRecord::new(group, decision, ground_truth))
        .collect()
}

/// Every male applicant is hired and every female applicant rejected.
pub(super) fn reference_scenario() -> Vec<DecisionRecord> {
    let mut records = Vec::new();
    records.extend(repeat("male", 1, 1, 4));
    records.extend(repeat("male", 1, 0, 1));
    records.extend(repeat("female", 0, 1, 3));
    records.extend(repeat("female", 0, 0, 2));
    records
}

/// Both groups hired at 50% with identical true/false positive rates.
pub(super) fn balanced_scenario() -> Vec<DecisionRecord> {
    let mut records = Vec::new();
    for group in ["group_a", "group_b"] {
        records.extend(repeat(group, 1, 1, 2));
        records.extend(repeat(group, 0, 1, 2));
        records.extend(repeat(group, 1, 0, 2));
        records.extend(repeat(group, 0, 0, 2));
    }
    records
}

pub(super) fn male_privileged() -> GroupConfig {
    GroupConfig::new("male", "female")
}

pub(super) fn female_privileged() -> GroupConfig {
    GroupConfig::new("female", "male")
}

pub(super) fn auditor() -> FairnessAuditor {
    FairnessAuditor::default()
}
