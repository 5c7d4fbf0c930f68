use serde::{Deserialize, Serialize};

use super::domain::{FairnessMetric, FairnessMetrics, MetricValue, Severity, Violation};

/// Regulatory thresholds used to grade metric values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairnessThresholds {
    pub difference_medium: f64,
    pub difference_high: f64,
    pub impact_medium: f64,
    pub impact_high: f64,
    pub impact_critical: f64,
}

impl Default for FairnessThresholds {
    fn default() -> Self {
        Self {
            difference_medium: 0.1,
            difference_high: 0.2,
            impact_medium: 0.8,
            impact_high: 0.65,
            impact_critical: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    /// Breach when `|value|` exceeds the band.
    AbsoluteDifference,
    /// Breach when the ratio falls below the band (four-fifths rule family).
    ImpactRatio,
}

fn rule_for(metric: FairnessMetric) -> Rule {
    match metric {
        FairnessMetric::DisparateImpactRatio => Rule::ImpactRatio,
        FairnessMetric::StatisticalParityDifference
        | FairnessMetric::EqualOpportunityDifference
        | FairnessMetric::EqualizedOddsDifference
        | FairnessMetric::PredictiveParityDifference => Rule::AbsoluteDifference,
    }
}

/// Violations plus notes about metrics that could not be computed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub violations: Vec<Violation>,
    pub data_quality_notes: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ViolationClassifier {
    thresholds: FairnessThresholds,
}

impl ViolationClassifier {
    pub fn new(thresholds: FairnessThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &FairnessThresholds {
        &self.thresholds
    }

    /// Returns the severity and the band boundary that fired, if any.
    pub fn grade(&self, metric: FairnessMetric, value: f64) -> Option<(Severity, f64)> {
        let t = &self.thresholds;
        match rule_for(metric) {
            Rule::AbsoluteDifference => {
                let magnitude = value.abs();
                if magnitude > t.difference_high {
                    Some((Severity::High, t.difference_high))
                } else if magnitude > t.difference_medium {
                    Some((Severity::Medium, t.difference_medium))
                } else {
                    None
                }
            }
            Rule::ImpactRatio => {
                if value < t.impact_critical {
                    Some((Severity::Critical, t.impact_critical))
                } else if value < t.impact_high {
                    Some((Severity::High, t.impact_high))
                } else if value < t.impact_medium {
                    Some((Severity::Medium, t.impact_medium))
                } else {
                    None
                }
            }
        }
    }

    pub fn classify(&self, metrics: &FairnessMetrics) -> Classification {
        let mut classification = Classification::default();

        for metric in FairnessMetric::ALL {
            match metrics.get(metric) {
                MetricValue::Value(value) => {
                    if let Some((severity, threshold)) = self.grade(metric, value) {
                        classification.violations.push(Violation {
                            metric,
                            value,
                            threshold,
                            severity,
                            interpretation: interpret(metric, value, metrics),
                        });
                    }
                }
                MetricValue::InsufficientData => classification
                    .data_quality_notes
                    .push(insufficient_note(metric, metrics)),
            }
        }

        classification
    }
}

fn points(value: f64) -> String {
    format!("{:.1}", value.abs() * 100.0)
}

fn direction(value: f64, below: &'static str, above: &'static str) -> &'static str {
    if value < 0.0 {
        below
    } else {
        above
    }
}

fn interpret(metric: FairnessMetric, value: f64, metrics: &FairnessMetrics) -> String {
    let privileged = &metrics.privileged.group;
    let unprivileged = &metrics.unprivileged.group;
    match metric {
        FairnessMetric::StatisticalParityDifference => format!(
            "{unprivileged} candidates receive favorable decisions at a rate {} percentage points {} than {privileged} candidates",
            points(value),
            direction(value, "lower", "higher"),
        ),
        FairnessMetric::DisparateImpactRatio => format!(
            "selection rate for {unprivileged} is {:.1}% of the rate for {privileged}, below the EEOC four-fifths (80%) rule",
            value * 100.0
        ),
        FairnessMetric::EqualOpportunityDifference => format!(
            "qualified {unprivileged} candidates are selected {} percentage points {} often than qualified {privileged} candidates",
            points(value),
            direction(value, "less", "more"),
        ),
        FairnessMetric::EqualizedOddsDifference => format!(
            "true and false positive rates differ by an average of {} percentage points between {unprivileged} and {privileged}",
            points(value)
        ),
        FairnessMetric::PredictiveParityDifference => format!(
            "favorable decisions for {unprivileged} are {} percentage points {} likely to be warranted than for {privileged}",
            points(value),
            direction(value, "less", "more"),
        ),
    }
}

fn insufficient_note(metric: FairnessMetric, metrics: &FairnessMetrics) -> String {
    let reason = match metric {
        FairnessMetric::StatisticalParityDifference => "a compared group has no decision records",
        FairnessMetric::DisparateImpactRatio => {
            "the privileged group has no favorable decisions or a compared group has no records"
        }
        FairnessMetric::EqualOpportunityDifference => {
            "a compared group has no records with ground_truth = 1"
        }
        FairnessMetric::EqualizedOddsDifference => {
            "a compared group lacks records with ground_truth = 1 or ground_truth = 0"
        }
        FairnessMetric::PredictiveParityDifference => {
            "a compared group has no favorable decisions"
        }
    };
    format!(
        "{metric} is insufficient_data for {} vs {}: {reason}",
        metrics.unprivileged.group, metrics.privileged.group
    )
}
