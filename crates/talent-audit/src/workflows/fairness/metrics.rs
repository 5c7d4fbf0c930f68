use std::collections::{BTreeMap, BTreeSet};

use super::domain::{
    DecisionRecord, FairnessMetric, FairnessMetrics, GroupConfig, GroupStatistics, MetricValue,
};

/// Reasons an audit is refused or aborted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FairnessError {
    #[error("protected attribute name is required")]
    MissingAttributeName,
    #[error("no decision records supplied")]
    EmptyBatch,
    #[error("record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
    #[error("invalid favorable label: {0}")]
    InvalidLabel(String),
    #[error("invalid group configuration: {0}")]
    InvalidGroups(String),
    #[error("internal fairness computation fault ({reason}); input fingerprint {fingerprint}")]
    Internal { reason: String, fingerprint: String },
}

impl FairnessError {
    pub const fn code(&self) -> &'static str {
        match self {
            FairnessError::Internal { .. } => "INTERNAL",
            _ => "INVALID_INPUT",
        }
    }
}

/// The privileged/unprivileged pair an audit compares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPair {
    pub privileged: String,
    pub unprivileged: String,
}

#[derive(Debug, Clone, Copy, Default)]
struct GroupCounts {
    total: usize,
    favorable: usize,
    positives: usize,
    true_positives: usize,
    negatives: usize,
    false_positives: usize,
}

impl GroupCounts {
    fn tally<'a>(records: impl Iterator<Item = &'a DecisionRecord>) -> Self {
        records.fold(Self::default(), |mut counts, record| {
            let favorable = record.decision == 1;
            counts.total += 1;
            if favorable {
                counts.favorable += 1;
            }
            if record.ground_truth == 1 {
                counts.positives += 1;
                if favorable {
                    counts.true_positives += 1;
                }
            } else {
                counts.negatives += 1;
                if favorable {
                    counts.false_positives += 1;
                }
            }
            counts
        })
    }

    fn base_rate(&self) -> MetricValue {
        MetricValue::ratio(self.favorable, self.total)
    }

    fn true_positive_rate(&self) -> MetricValue {
        MetricValue::ratio(self.true_positives, self.positives)
    }

    fn false_positive_rate(&self) -> MetricValue {
        MetricValue::ratio(self.false_positives, self.negatives)
    }

    fn precision(&self) -> MetricValue {
        MetricValue::ratio(self.true_positives, self.favorable)
    }

    fn statistics(&self, group: &str) -> GroupStatistics {
        GroupStatistics {
            group: group.to_string(),
            count: self.total,
            favorable: self.favorable,
            base_rate: self.base_rate().rounded(),
            true_positive_rate: self.true_positive_rate().rounded(),
            false_positive_rate: self.false_positive_rate().rounded(),
            precision: self.precision().rounded(),
        }
    }
}

/// Pure group-statistics calculator over a batch of decision records.
///
/// Difference metrics are reported as unprivileged minus privileged.
#[derive(Debug, Clone, Copy, Default)]
pub struct FairnessMetricsEngine;

impl FairnessMetricsEngine {
    pub fn compute(
        &self,
        records: &[DecisionRecord],
        protected_attribute: &str,
        groups: &GroupConfig,
    ) -> Result<FairnessMetrics, FairnessError> {
        if protected_attribute.trim().is_empty() {
            return Err(FairnessError::MissingAttributeName);
        }
        if records.is_empty() {
            return Err(FairnessError::EmptyBatch);
        }
        validate_records(records)?;

        let pair = resolve_groups(records, groups)?;
        let privileged = GroupCounts::tally(
            records
                .iter()
                .filter(|record| record.protected_attribute_value.trim() == pair.privileged),
        );
        let unprivileged = GroupCounts::tally(
            records
                .iter()
                .filter(|record| record.protected_attribute_value.trim() == pair.unprivileged),
        );

        let tpr_gap = unprivileged
            .true_positive_rate()
            .map2(privileged.true_positive_rate(), |u, p| (u - p).abs());
        let fpr_gap = unprivileged
            .false_positive_rate()
            .map2(privileged.false_positive_rate(), |u, p| (u - p).abs());

        let disparate_impact = match privileged.base_rate() {
            MetricValue::Value(rate) if rate > 0.0 => unprivileged
                .base_rate()
                .map2(MetricValue::Value(rate), |u, p| u / p),
            _ => MetricValue::InsufficientData,
        };

        let mut values = BTreeMap::new();
        values.insert(
            FairnessMetric::StatisticalParityDifference,
            unprivileged
                .base_rate()
                .map2(privileged.base_rate(), |u, p| u - p),
        );
        values.insert(FairnessMetric::DisparateImpactRatio, disparate_impact);
        values.insert(
            FairnessMetric::EqualOpportunityDifference,
            unprivileged
                .true_positive_rate()
                .map2(privileged.true_positive_rate(), |u, p| u - p),
        );
        values.insert(
            FairnessMetric::EqualizedOddsDifference,
            tpr_gap.map2(fpr_gap, |tpr, fpr| (tpr + fpr) / 2.0),
        );
        values.insert(
            FairnessMetric::PredictiveParityDifference,
            unprivileged
                .precision()
                .map2(privileged.precision(), |u, p| u - p),
        );
        let values = values
            .into_iter()
            .map(|(metric, value)| (metric, value.rounded()))
            .collect();

        Ok(FairnessMetrics {
            protected_attribute: protected_attribute.trim().to_string(),
            privileged: privileged.statistics(&pair.privileged),
            unprivileged: unprivileged.statistics(&pair.unprivileged),
            values,
        })
    }
}

fn validate_records(records: &[DecisionRecord]) -> Result<(), FairnessError> {
    for (index, record) in records.iter().enumerate() {
        if record.protected_attribute_value.trim().is_empty() {
            return Err(FairnessError::InvalidRecord {
                index,
                reason: "protected attribute value is empty".to_string(),
            });
        }
        if record.decision > 1 {
            return Err(FairnessError::InvalidRecord {
                index,
                reason: format!("decision must be 0 or 1, found {}", record.decision),
            });
        }
        if record.ground_truth > 1 {
            return Err(FairnessError::InvalidRecord {
                index,
                reason: format!("ground_truth must be 0 or 1, found {}", record.ground_truth),
            });
        }
    }
    Ok(())
}

/// Pick the group pair to compare.
///
/// Unconfigured batches must contain exactly two groups; the one with the higher
/// favorable rate becomes the reference, ties going to the smaller name.
pub fn resolve_groups(
    records: &[DecisionRecord],
    config: &GroupConfig,
) -> Result<GroupPair, FairnessError> {
    let distinct: BTreeSet<&str> = records
        .iter()
        .map(|record| record.protected_attribute_value.trim())
        .collect();
    let privileged = config.privileged.as_deref().map(str::trim);
    let unprivileged = config.unprivileged.as_deref().map(str::trim);

    let pair = match (privileged, unprivileged) {
        (Some(privileged), Some(unprivileged)) => GroupPair {
            privileged: privileged.to_string(),
            unprivileged: unprivileged.to_string(),
        },
        (Some(privileged), None) => GroupPair {
            privileged: privileged.to_string(),
            unprivileged: sole_other(&distinct, privileged)?,
        },
        (None, Some(unprivileged)) => GroupPair {
            privileged: sole_other(&distinct, unprivileged)?,
            unprivileged: unprivileged.to_string(),
        },
        (None, None) => {
            let groups: Vec<&str> = distinct.iter().copied().collect();
            if groups.len() != 2 {
                return Err(FairnessError::InvalidGroups(format!(
                    "expected exactly two groups without a configuration, found {}",
                    groups.len()
                )));
            }
            let rate = |group: &str| {
                GroupCounts::tally(
                    records
                        .iter()
                        .filter(|record| record.protected_attribute_value.trim() == group),
                )
                .base_rate()
                .value()
                .unwrap_or(0.0)
            };
            let (first, second) = (groups[0], groups[1]);
            if rate(second) > rate(first) {
                GroupPair {
                    privileged: second.to_string(),
                    unprivileged: first.to_string(),
                }
            } else {
                GroupPair {
                    privileged: first.to_string(),
                    unprivileged: second.to_string(),
                }
            }
        }
    };

    if pair.privileged.is_empty() || pair.unprivileged.is_empty() {
        return Err(FairnessError::InvalidGroups(
            "group names must not be empty".to_string(),
        ));
    }
    if pair.privileged == pair.unprivileged {
        return Err(FairnessError::InvalidGroups(format!(
            "privileged and unprivileged groups are both '{}'",
            pair.privileged
        )));
    }

    Ok(pair)
}

fn sole_other(distinct: &BTreeSet<&str>, configured: &str) -> Result<String, FairnessError> {
    let others: Vec<&str> = distinct
        .iter()
        .copied()
        .filter(|group| *group != configured)
        .collect();
    match others.as_slice() {
        [other] => Ok(other.to_string()),
        [] => Err(FairnessError::InvalidGroups(format!(
            "no comparison group found besides '{configured}'"
        ))),
        _ => Err(FairnessError::InvalidGroups(format!(
            "{} candidate comparison groups besides '{configured}'; configure both groups",
            others.len()
        ))),
    }
}
