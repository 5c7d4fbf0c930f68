use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::service::{ServiceError, TalentAuditService, DEFAULT_TIMELINE_LIMIT};
use crate::audit::{AuditScope, AuditSink};
use crate::workflows::fairness::{FairnessError, FairnessReport, FavorableLabel, GroupConfig};
use crate::workflows::ranking::{Candidate, Job, JobId, RankedCandidate, ScoreWeights};

/// Router builder exposing the analyze, rank, and audit timeline endpoints.
pub fn engine_router<S>(service: Arc<TalentAuditService<S>>) -> Router
where
    S: AuditSink + 'static,
{
    Router::new()
        .route("/analyze", post(analyze_handler::<S>))
        .route("/rank", post(rank_handler::<S>))
        .route("/audit/timeline", get(timeline_handler::<S>))
        .with_state(service)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub applications: Vec<Value>,
    #[serde(default)]
    pub protected_attribute_name: Option<String>,
    #[serde(default)]
    pub favorable_label: Option<Value>,
    #[serde(default)]
    pub privileged_group: Option<String>,
    #[serde(default)]
    pub unprivileged_group: Option<String>,
    #[serde(default)]
    pub actor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankRequest {
    pub job: Job,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub weights: Option<ScoreWeights>,
    #[serde(default)]
    pub actor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelineQuery {
    pub scope: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
struct AnalyzeResponse<'a> {
    #[serde(flatten)]
    report: &'a FairnessReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    audit_warning: Option<&'a str>,
}

#[derive(Serialize)]
struct RankResponse<'a> {
    job_id: &'a JobId,
    rankings: &'a [RankedCandidate],
    #[serde(skip_serializing_if = "Option::is_none")]
    audit_warning: Option<&'a str>,
}

fn invalid_input(message: impl Into<String>) -> Response {
    let payload = json!({
        "error": message.into(),
        "code": "INVALID_INPUT",
    });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
}

fn service_error(error: ServiceError) -> Response {
    let status = match error.code() {
        "INTERNAL" => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    let payload = json!({
        "error": error.to_string(),
        "code": error.code(),
    });
    (status, Json(payload)).into_response()
}

pub(crate) async fn analyze_handler<S>(
    State(service): State<Arc<TalentAuditService<S>>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response
where
    S: AuditSink + 'static,
{
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => return invalid_input(rejection.body_text()),
    };

    let attribute = match request
        .protected_attribute_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
    {
        Some(attribute) => attribute.to_string(),
        None => return service_error(FairnessError::MissingAttributeName.into()),
    };
    let label = match request.favorable_label.as_ref() {
        Some(value) => match FavorableLabel::from_value(value) {
            Ok(label) => label,
            Err(err) => return service_error(err.into()),
        },
        None => FavorableLabel::default(),
    };
    let groups = GroupConfig {
        privileged: request.privileged_group.clone(),
        unprivileged: request.unprivileged_group.clone(),
    };

    match service.audit_applications(
        &request.applications,
        &attribute,
        &label,
        &groups,
        request.actor.as_deref(),
    ) {
        Ok(audited) => {
            let body = AnalyzeResponse {
                report: &audited.result,
                audit_warning: audited.audit_warning.as_deref(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => service_error(err),
    }
}

pub(crate) async fn rank_handler<S>(
    State(service): State<Arc<TalentAuditService<S>>>,
    payload: Result<Json<RankRequest>, JsonRejection>,
) -> Response
where
    S: AuditSink + 'static,
{
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => return invalid_input(rejection.body_text()),
    };

    match service.rank_candidates(
        &request.job,
        &request.candidates,
        request.weights,
        request.actor.as_deref(),
    ) {
        Ok(audited) => {
            let body = RankResponse {
                job_id: &request.job.id,
                rankings: &audited.result,
                audit_warning: audited.audit_warning.as_deref(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => service_error(err),
    }
}

pub(crate) async fn timeline_handler<S>(
    State(service): State<Arc<TalentAuditService<S>>>,
    Query(query): Query<TimelineQuery>,
) -> Response
where
    S: AuditSink + 'static,
{
    let scope = match query.scope.as_deref().map(str::trim).filter(|scope| !scope.is_empty()) {
        Some(scope) => AuditScope(scope.to_string()),
        None => return invalid_input("scope query parameter is required"),
    };
    let limit = query.limit.unwrap_or(DEFAULT_TIMELINE_LIMIT);

    match service.audit_timeline(&scope, limit) {
        Ok(events) => (StatusCode::OK, Json(events)).into_response(),
        Err(err) => {
            let payload = json!({
                "error": err.to_string(),
                "code": "PERSISTENCE_FAILURE",
            });
            (StatusCode::SERVICE_UNAVAILABLE, Json(payload)).into_response()
        }
    }
}
