use super::common::*;
use crate::workflows::fairness::domain::{FairnessMetric, Severity};
use crate::workflows::fairness::metrics::FairnessMetricsEngine;
use crate::workflows::fairness::violations::ViolationClassifier;

#[test]
fn difference_metrics_use_absolute_bands() {
    let classifier = ViolationClassifier::default();
    let metric = FairnessMetric::StatisticalParityDifference;

    assert_eq!(classifier.grade(metric, 0.1), None);
    assert_eq!(classifier.grade(metric, 0.15), Some((Severity::Medium, 0.1)));
    assert_eq!(classifier.grade(metric, -0.15), Some((Severity::Medium, 0.1)));
    assert_eq!(classifier.grade(metric, 0.2), Some((Severity::Medium, 0.1)));
    assert_eq!(classifier.grade(metric, -0.25), Some((Severity::High, 0.2)));
    assert_eq!(
        classifier.grade(FairnessMetric::PredictiveParityDifference, 0.21),
        Some((Severity::High, 0.2))
    );
}

#[test]
fn impact_ratio_follows_four_fifths_bands() {
    let classifier = ViolationClassifier::default();
    let metric = FairnessMetric::DisparateImpactRatio;

    assert_eq!(classifier.grade(metric, 1.3), None);
    assert_eq!(classifier.grade(metric, 0.8), None);
    assert_eq!(classifier.grade(metric, 0.79), Some((Severity::Medium, 0.8)));
    assert_eq!(classifier.grade(metric, 0.65), Some((Severity::Medium, 0.8)));
    assert_eq!(classifier.grade(metric, 0.64), Some((Severity::High, 0.65)));
    assert_eq!(classifier.grade(metric, 0.49), Some((Severity::Critical, 0.5)));
    assert_eq!(classifier.grade(metric, 0.0), Some((Severity::Critical, 0.5)));
}

#[test]
fn reference_scenario_yields_ordered_violations_and_a_data_note() {
    let metrics = FairnessMetricsEngine
        .compute(&reference_scenario(), "gender", &male_privileged())
        .expect("metrics compute");
    let classification = ViolationClassifier::default().classify(&metrics);

    let summary: Vec<(FairnessMetric, Severity)> = classification
        .violations
        .iter()
        .map(|violation| (violation.metric, violation.severity))
        .collect();
    assert_eq!(
        summary,
        vec![
            (FairnessMetric::StatisticalParityDifference, Severity::High),
            (FairnessMetric::DisparateImpactRatio, Severity::Critical),
            (FairnessMetric::EqualOpportunityDifference, Severity::High),
            (FairnessMetric::EqualizedOddsDifference, Severity::High),
        ]
    );

    let impact = &classification.violations[1];
    assert!(impact.interpretation.contains("four-fifths"));
    assert!(impact.interpretation.contains("female"));
    assert!(classification.violations[0]
        .interpretation
        .contains("100.0 percentage points lower"));

    assert_eq!(classification.data_quality_notes.len(), 1);
    assert!(classification.data_quality_notes[0].starts_with("predictive_parity_difference"));
}

#[test]
fn balanced_scenario_has_no_violations() {
    let metrics = FairnessMetricsEngine
        .compute(&balanced_scenario(), "team", &Default::default())
        .expect("metrics compute");
    let classification = ViolationClassifier::default().classify(&metrics);
    assert!(classification.violations.is_empty());
    assert!(classification.data_quality_notes.is_empty());
}
