use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::badge::{FairnessBadge, FairnessBadgeGrader, PenaltyWeights};
use super::domain::{DecisionRecord, FairnessMetric, FairnessMetrics, GroupConfig, MetricValue, Violation};
use super::metrics::{FairnessError, FairnessMetricsEngine};
use super::recommendations::RecommendationGenerator;
use super::violations::{FairnessThresholds, ViolationClassifier};
use crate::fingerprint::fingerprint;

/// Graded outcome of one fairness audit.
///
/// Field order matches the published JSON contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessReport {
    pub bias_detected: bool,
    pub fairness_badge: FairnessBadge,
    pub fairness_metrics: BTreeMap<FairnessMetric, MetricValue>,
    pub violations: Vec<Violation>,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_quality_notes: Vec<String>,
}

/// Report together with the group statistics it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FairnessAudit {
    pub report: FairnessReport,
    pub metrics: FairnessMetrics,
}

/// Runs metrics, classification, grading, and recommendations as one pure step.
#[derive(Debug, Clone, Default)]
pub struct FairnessAuditor {
    engine: FairnessMetricsEngine,
    classifier: ViolationClassifier,
    grader: FairnessBadgeGrader,
    recommender: RecommendationGenerator,
}

impl FairnessAuditor {
    pub fn new(thresholds: FairnessThresholds, penalties: PenaltyWeights) -> Self {
        Self {
            engine: FairnessMetricsEngine,
            classifier: ViolationClassifier::new(thresholds),
            grader: FairnessBadgeGrader::new(penalties),
            recommender: RecommendationGenerator,
        }
    }

    pub fn audit(
        &self,
        records: &[DecisionRecord],
        protected_attribute: &str,
        groups: &GroupConfig,
    ) -> Result<FairnessAudit, FairnessError> {
        let metrics = self.engine.compute(records, protected_attribute, groups)?;

        if let Some((metric, value)) = metrics
            .values
            .iter()
            .find_map(|(metric, value)| value.value().filter(|v| !v.is_finite()).map(|v| (metric, v)))
        {
            return Err(FairnessError::Internal {
                reason: format!("{metric} evaluated to {value}"),
                fingerprint: fingerprint(&(protected_attribute, groups, records)),
            });
        }

        let classification = self.classifier.classify(&metrics);
        let fairness_badge = self.grader.grade(&classification.violations);
        let recommendations = self.recommender.generate(&classification.violations);

        let report = FairnessReport {
            bias_detected: !classification.violations.is_empty(),
            fairness_badge,
            fairness_metrics: metrics.values.clone(),
            violations: classification.violations,
            recommendations,
            data_quality_notes: classification.data_quality_notes,
        };

        Ok(FairnessAudit { report, metrics })
    }
}
