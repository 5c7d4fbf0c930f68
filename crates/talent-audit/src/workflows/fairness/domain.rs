use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// One hiring decision, labelled with the group it belongs to.
///
/// `decision` is 1 for the favorable outcome; `ground_truth` is 1 when the
/// favorable outcome was warranted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub protected_attribute_value: String,
    pub decision: u8,
    pub ground_truth: u8,
}

impl DecisionRecord {
    pub fn new(group: impl Into<String>, decision: u8, ground_truth: u8) -> Self {
        Self {
            protected_attribute_value: group.into(),
            decision,
            ground_truth,
        }
    }
}

/// Caller designation of the reference (privileged) and comparison groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    #[serde(default)]
    pub privileged: Option<String>,
    #[serde(default)]
    pub unprivileged: Option<String>,
}

impl GroupConfig {
    pub fn new(privileged: impl Into<String>, unprivileged: impl Into<String>) -> Self {
        Self {
            privileged: Some(privileged.into()),
            unprivileged: Some(unprivileged.into()),
        }
    }
}

/// Group metrics reported by an audit, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FairnessMetric {
    StatisticalParityDifference,
    DisparateImpactRatio,
    EqualOpportunityDifference,
    EqualizedOddsDifference,
    PredictiveParityDifference,
}

impl FairnessMetric {
    pub const ALL: [FairnessMetric; 5] = [
        FairnessMetric::StatisticalParityDifference,
        FairnessMetric::DisparateImpactRatio,
        FairnessMetric::EqualOpportunityDifference,
        FairnessMetric::EqualizedOddsDifference,
        FairnessMetric::PredictiveParityDifference,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            FairnessMetric::StatisticalParityDifference => "statistical_parity_difference",
            FairnessMetric::DisparateImpactRatio => "disparate_impact_ratio",
            FairnessMetric::EqualOpportunityDifference => "equal_opportunity_difference",
            FairnessMetric::EqualizedOddsDifference => "equalized_odds_difference",
            FairnessMetric::PredictiveParityDifference => "predictive_parity_difference",
        }
    }
}

impl fmt::Display for FairnessMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const INSUFFICIENT_DATA: &str = "insufficient_data";

/// A computed statistic, or the marker for an empty denominator.
///
/// Serializes as a JSON number or the string `"insufficient_data"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Value(f64),
    InsufficientData,
}

impl MetricValue {
    pub fn value(self) -> Option<f64> {
        match self {
            MetricValue::Value(value) => Some(value),
            MetricValue::InsufficientData => None,
        }
    }

    pub fn is_insufficient(self) -> bool {
        matches!(self, MetricValue::InsufficientData)
    }

    pub(crate) fn ratio(numerator: usize, denominator: usize) -> Self {
        if denominator == 0 {
            MetricValue::InsufficientData
        } else {
            MetricValue::Value(numerator as f64 / denominator as f64)
        }
    }

    pub(crate) fn map2(self, other: MetricValue, op: impl FnOnce(f64, f64) -> f64) -> Self {
        match (self, other) {
            (MetricValue::Value(left), MetricValue::Value(right)) => {
                MetricValue::Value(op(left, right))
            }
            _ => MetricValue::InsufficientData,
        }
    }

    /// Rounded to four decimal places so thresholds compare against reported values.
    pub(crate) fn rounded(self) -> Self {
        match self {
            MetricValue::Value(value) => MetricValue::Value((value * 10_000.0).round() / 10_000.0),
            MetricValue::InsufficientData => MetricValue::InsufficientData,
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetricValue::Value(value) => serializer.serialize_f64(*value),
            MetricValue::InsufficientData => serializer.serialize_str(INSUFFICIENT_DATA),
        }
    }
}

impl<'de> Deserialize<'de> for MetricValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(MetricValue::Value(value)),
            Raw::Text(text) if text == INSUFFICIENT_DATA => Ok(MetricValue::InsufficientData),
            Raw::Text(text) => Err(de::Error::custom(format!(
                "expected a number or \"{INSUFFICIENT_DATA}\", found \"{text}\""
            ))),
        }
    }
}

/// Per-group rates backing the pairwise metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStatistics {
    pub group: String,
    pub count: usize,
    pub favorable: usize,
    pub base_rate: MetricValue,
    pub true_positive_rate: MetricValue,
    pub false_positive_rate: MetricValue,
    pub precision: MetricValue,
}

/// Output of the metrics engine for one privileged/unprivileged pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessMetrics {
    pub protected_attribute: String,
    pub privileged: GroupStatistics,
    pub unprivileged: GroupStatistics,
    pub values: BTreeMap<FairnessMetric, MetricValue>,
}

impl FairnessMetrics {
    pub fn get(&self, metric: FairnessMetric) -> MetricValue {
        self.values
            .get(&metric)
            .copied()
            .unwrap_or(MetricValue::InsufficientData)
    }
}

/// Severity assigned to a threshold breach, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// A metric that crossed one of its configured thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub metric: FairnessMetric,
    pub value: f64,
    pub threshold: f64,
    pub severity: Severity,
    pub interpretation: String,
}
