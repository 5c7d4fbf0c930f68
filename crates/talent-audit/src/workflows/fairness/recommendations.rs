use std::collections::BTreeSet;

use super::domain::{FairnessMetric, Severity, Violation};

const NO_BIAS: &str = "No significant bias detected; continue periodic fairness monitoring";
const DOCUMENT_FINDINGS: &str =
    "Document these findings and the remediation plan in the compliance record";

fn templates(metric: FairnessMetric, severity: Severity) -> &'static [&'static str] {
    use FairnessMetric::*;
    use Severity::*;

    match (metric, severity) {
        (_, Low) => &[],
        (StatisticalParityDifference, Medium) => {
            &["Review screening criteria for requirements that affect groups unevenly"]
        }
        (StatisticalParityDifference, High | Critical) => &[
            "Review screening criteria for requirements that affect groups unevenly",
            "Trace each pipeline stage to find where selection rates diverge",
        ],
        (DisparateImpactRatio, Medium) => &[
            "Conduct adverse impact analysis",
            "Consider blind resume screening",
        ],
        (DisparateImpactRatio, High) => &[
            "Conduct adverse impact analysis",
            "Consider blind resume screening",
            "Validate that selection criteria are job-related and consistent with business necessity",
        ],
        (DisparateImpactRatio, Critical) => &[
            "Conduct adverse impact analysis",
            "Consider blind resume screening",
            "Validate that selection criteria are job-related and consistent with business necessity",
            "Pause automated shortlisting for this role pending a compliance review",
        ],
        (EqualOpportunityDifference, Medium) => {
            &["Compare how qualified candidates from each group are evaluated"]
        }
        (EqualOpportunityDifference, High | Critical) => &[
            "Compare how qualified candidates from each group are evaluated",
            "Recalibrate scoring so qualified candidates advance at equal rates",
        ],
        (EqualizedOddsDifference, Medium) => {
            &["Examine both false acceptances and false rejections by group"]
        }
        (EqualizedOddsDifference, High | Critical) => &[
            "Examine both false acceptances and false rejections by group",
            "Re-validate decision thresholds against each group's error rates",
        ],
        (PredictiveParityDifference, Medium) => {
            &["Verify that favorable decisions are equally well-founded across groups"]
        }
        (PredictiveParityDifference, High | Critical) => &[
            "Verify that favorable decisions are equally well-founded across groups",
            "Review interviewer and reviewer calibration for consistency",
        ],
    }
}

/// Rule-table lookup from violations to remediation text.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationGenerator;

impl RecommendationGenerator {
    /// Recommendations in violation order, without duplicates.
    pub fn generate(&self, violations: &[Violation]) -> Vec<String> {
        if violations.is_empty() {
            return vec![NO_BIAS.to_string()];
        }

        let mut seen = BTreeSet::new();
        let mut recommendations: Vec<String> = violations
            .iter()
            .flat_map(|violation| templates(violation.metric, violation.severity).iter())
            .filter(|text| seen.insert(**text))
            .map(|text| text.to_string())
            .collect();
        recommendations.push(DOCUMENT_FINDINGS.to_string());
        recommendations
    }
}
