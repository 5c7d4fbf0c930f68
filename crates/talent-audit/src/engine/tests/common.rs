use std::sync::Arc;

use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use crate::audit::{AuditEvent, AuditScope, AuditSink, AuditStoreError, InMemoryAuditLog};
use crate::config::EngineConfig;
use crate::engine::{engine_router, TalentAuditService};
use crate::workflows::ranking::{Candidate, CandidateId, Job, JobId};

pub(super) fn build_service() -> (TalentAuditService<InMemoryAuditLog>, Arc<InMemoryAuditLog>) {
    let sink = Arc::new(InMemoryAuditLog::new());
    let service = TalentAuditService::new(sink.clone(), EngineConfig::default(), "system");
    (service, sink)
}

pub(super) fn failing_service() -> TalentAuditService<FailingSink> {
    TalentAuditService::new(Arc::new(FailingSink), EngineConfig::default(), "system")
}

pub(super) fn router_with_service(service: TalentAuditService<InMemoryAuditLog>) -> axum::Router {
    engine_router(Arc::new(service))
}

pub(super) struct FailingSink;

impl AuditSink for FailingSink {
    fn append(&self, _event: &AuditEvent) -> Result<(), AuditStoreError> {
        Err(AuditStoreError::Unavailable("audit volume offline".to_string()))
    }

    fn timeline(&self, _scope: &AuditScope, _limit: usize) -> Result<Vec<AuditEvent>, AuditStoreError> {
        Err(AuditStoreError::Unavailable("audit volume offline".to_string()))
    }
}

pub(super) fn job() -> Job {
    Job {
        id: JobId("job-1".to_string()),
        required_skills: vec!["Rust".to_string(), "SQL".to_string(), "Docker".to_string()],
        expected_experience_years: Some(5.0),
        weights: None,
    }
}

fn candidate(id: &str, skills: &[&str], years: Option<f64>, day: u32) -> Candidate {
    Candidate {
        id: CandidateId(id.to_string()),
        skills: skills.iter().map(|skill| skill.to_string()).collect(),
        years_experience: years,
        education: "BSc".to_string(),
        applied_at: Utc
            .with_ymd_and_hms(2025, 2, day, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

/// Expected order: c-1 (100.0), c-2 (59.8), c-3 (56.2), c-4 (0.0).
pub(super) fn candidates() -> Vec<Candidate> {
    vec![
        candidate("c-3", &["sql", "docker"], Some(2.0), 3),
        candidate("c-4", &[], None, 4),
        candidate("c-1", &["Rust", "SQL", "Docker"], Some(6.0), 1),
        candidate("c-2", &["rust"], Some(5.0), 2),
    ]
}

fn application(gender: &str, decision: u8, ground_truth: u8, count: usize) -> Vec<Value> {
    (0..count)
        .map(|_| json!({ "gender": gender, "decision": decision, "ground_truth": ground_truth }))
        .collect()
}

/// Every male applicant hired, every female applicant rejected.
pub(super) fn reference_applications() -> Vec<Value> {
    let mut applications = Vec::new();
    applications.extend(application("male", 1, 1, 4));
    applications.extend(application("male", 1, 0, 1));
    applications.extend(application("female", 0, 1, 3));
    applications.extend(application("female", 0, 0, 2));
    applications
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
