//! Group fairness metrics, violation grading, and report assembly for hiring decisions.
//!
//! Everything in this module is a pure function of its inputs: the same decision batch and
//! thresholds always produce the same report.

pub mod badge;
pub mod domain;
pub mod import;
pub mod intake;
pub mod metrics;
pub mod recommendations;
pub mod report;
pub mod violations;

#[cfg(test)]
mod tests;

pub use badge::{FairnessBadge, FairnessBadgeGrader, Grade, PenaltyWeights};
pub use domain::{
    DecisionRecord, FairnessMetric, FairnessMetrics, GroupConfig, GroupStatistics, MetricValue,
    Severity, Violation,
};
pub use import::{DecisionCsvImporter, DecisionImportError};
pub use intake::{binary_value, records_from_applications, FavorableLabel};
pub use metrics::{resolve_groups, FairnessError, FairnessMetricsEngine, GroupPair};
pub use recommendations::RecommendationGenerator;
pub use report::{FairnessAudit, FairnessAuditor, FairnessReport};
pub use violations::{Classification, FairnessThresholds, ViolationClassifier};
