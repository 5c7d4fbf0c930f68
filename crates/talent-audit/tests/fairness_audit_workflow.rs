//! End-to-end fairness audits through the public service facade and HTTP router.
//!
//! Scenarios cover the CSV and JSON intake paths, audit persistence to a JSON-lines file,
//! and the reported shape, without reaching into private modules.

mod common {
    use std::sync::Arc;

    use serde_json::{json, Value};

    use talent_audit::audit::JsonLinesAuditLog;
    use talent_audit::config::EngineConfig;
    use talent_audit::engine::TalentAuditService;

    pub(super) fn file_service(
        dir: &tempfile::TempDir,
    ) -> (TalentAuditService<JsonLinesAuditLog>, Arc<JsonLinesAuditLog>) {
        let sink = Arc::new(JsonLinesAuditLog::new(dir.path().join("audit.jsonl")));
        let service = TalentAuditService::new(sink.clone(), EngineConfig::default(), "compliance-bot");
        (service, sink)
    }

    pub(super) fn applications(group: &str, hired: usize, rejected: usize) -> Vec<Value> {
        let mut rows = Vec::new();
        for index in 0..hired {
            rows.push(json!({ "age_band": group, "status": "hired", "ground_truth": index % 2 == 0 }));
        }
        for index in 0..rejected {
            rows.push(json!({ "age_band": group, "status": "rejected", "ground_truth": index % 2 }));
        }
        rows
    }

    pub(super) const DECISIONS_CSV: &str = "gender,decision,ground_truth
male,1,1
male,1,1
male,1,1
male,1,1
male,1,0
female,0,1
female,0,1
female,0,1
female,0,0
female,0,0
";
}

use std::io::Cursor;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use talent_audit::audit::{AuditEventType, AuditScope, AuditSink};
use talent_audit::engine::engine_router;
use talent_audit::workflows::fairness::{
    DecisionCsvImporter, FairnessMetric, FavorableLabel, GroupConfig, Grade, MetricValue, Severity,
};

use common::*;

#[test]
fn csv_decisions_are_audited_and_persisted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (service, sink) = file_service(&dir);

    let records = DecisionCsvImporter::from_reader(
        Cursor::new(DECISIONS_CSV),
        "gender",
        &FavorableLabel::default(),
    )
    .expect("csv imports");
    let audited = service
        .audit_fairness(&records, "gender", &GroupConfig::new("male", "female"), None)
        .expect("audit runs");

    let report = &audited.result;
    assert!(report.bias_detected);
    assert_eq!(report.fairness_badge.grade, Grade::F);
    assert_eq!(
        report.fairness_metrics[&FairnessMetric::StatisticalParityDifference],
        MetricValue::Value(-1.0)
    );
    assert!(report
        .violations
        .iter()
        .any(|violation| violation.metric == FairnessMetric::DisparateImpactRatio
            && violation.severity == Severity::Critical));

    let timeline = sink
        .timeline(&AuditScope::fairness("gender"), 10)
        .expect("timeline reads");
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].event_type, AuditEventType::AuditRun);
    assert_eq!(timeline[0].actor, "compliance-bot");
    assert_eq!(
        Some(&timeline[0].id),
        audited.event.as_ref().map(|event| &event.id)
    );
}

#[test]
fn reversing_the_reference_group_flips_the_sign() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (service, _) = file_service(&dir);
    let records = DecisionCsvImporter::from_reader(
        Cursor::new(DECISIONS_CSV),
        "gender",
        &FavorableLabel::default(),
    )
    .expect("csv imports");

    let reversed = service
        .audit_fairness(&records, "gender", &GroupConfig::new("female", "male"), None)
        .expect("audit runs")
        .result;

    assert_eq!(
        reversed.fairness_metrics[&FairnessMetric::StatisticalParityDifference],
        MetricValue::Value(1.0)
    );
    assert_eq!(
        reversed.fairness_metrics[&FairnessMetric::DisparateImpactRatio],
        MetricValue::InsufficientData
    );
    assert!(reversed.bias_detected);
}

#[tokio::test]
async fn analyze_endpoint_grades_balanced_text_labels() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (service, sink) = file_service(&dir);
    let router = engine_router(std::sync::Arc::new(service));

    let mut rows = applications("under_40", 4, 4);
    rows.extend(applications("over_40", 4, 4));
    let body = json!({
        "applications": rows,
        "protected_attribute_name": "age_band",
        "favorable_label": "Hired",
        "privileged_group": "under_40",
        "unprivileged_group": "over_40",
    });

    let response = router
        .oneshot(
            Request::post("/analyze")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).expect("encode")))
                .expect("request builds"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let report: Value = serde_json::from_slice(&bytes).expect("json report");
    assert_eq!(report["bias_detected"], false);
    assert_eq!(report["fairness_badge"]["grade"], "A+");
    assert_eq!(report["fairness_metrics"]["statistical_parity_difference"], 0.0);
    assert_eq!(report["fairness_metrics"]["disparate_impact_ratio"], 1.0);
    assert_eq!(
        report["recommendations"],
        json!(["No significant bias detected; continue periodic fairness monitoring"])
    );

    let events = sink
        .timeline(&AuditScope::fairness("age_band"), 5)
        .expect("timeline reads");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].payload["record_count"], 16);
}
