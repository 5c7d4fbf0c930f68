use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::audit::{AuditEvent, AuditEventType, AuditLogger, AuditScope, AuditSink, AuditStoreError};
use crate::config::EngineConfig;
use crate::fingerprint::fingerprint;
use crate::workflows::fairness::{
    records_from_applications, DecisionRecord, FairnessAuditor, FairnessError, FairnessReport,
    FavorableLabel, GroupConfig,
};
use crate::workflows::ranking::{Candidate, CandidateRanker, Job, RankedCandidate, RankingError, ScoreWeights};

pub const DEFAULT_TIMELINE_LIMIT: usize = 50;
pub const MAX_TIMELINE_LIMIT: usize = 500;

/// A computed result plus the outcome of persisting its audit event.
#[derive(Debug, Clone, PartialEq)]
pub struct Audited<T> {
    pub result: T,
    pub event: Option<AuditEvent>,
    pub audit_warning: Option<String>,
}

/// Error raised by the engine service. Audit write failures are never part of it.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ranking(#[from] RankingError),
    #[error(transparent)]
    Fairness(#[from] FairnessError),
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Ranking(_) => "INVALID_INPUT",
            ServiceError::Fairness(err) => err.code(),
        }
    }
}

/// Service composing the ranker, the fairness auditor, and the audit logger.
pub struct TalentAuditService<S> {
    ranker: CandidateRanker,
    auditor: FairnessAuditor,
    logger: AuditLogger<S>,
    default_actor: String,
}

impl<S> TalentAuditService<S>
where
    S: AuditSink + 'static,
{
    pub fn new(sink: Arc<S>, config: EngineConfig, default_actor: impl Into<String>) -> Self {
        Self {
            ranker: CandidateRanker::new(config.ranking),
            auditor: FairnessAuditor::new(config.thresholds, config.penalties),
            logger: AuditLogger::new(sink),
            default_actor: default_actor.into(),
        }
    }

    pub fn ranker(&self) -> &CandidateRanker {
        &self.ranker
    }

    /// Rank candidates for a job and record a `ranking_run` event.
    pub fn rank_candidates(
        &self,
        job: &Job,
        candidates: &[Candidate],
        weights: Option<ScoreWeights>,
        actor: Option<&str>,
    ) -> Result<Audited<Vec<RankedCandidate>>, ServiceError> {
        let scope = AuditScope::job(&job.id.0);
        let rankings = self.ranker.rank(job, candidates, weights).map_err(|err| {
            info!(scope = %scope, error = %err, "ranking request rejected");
            err
        })?;

        let applied = self.ranker.resolve_weights(job, weights);
        let payload = json!({
            "job_id": job.id,
            "candidate_count": rankings.len(),
            "weights": applied,
            "match_mode": self.ranker.config().match_mode.label(),
            "input_fingerprint": fingerprint(&(job, candidates, weights)),
            "rankings": rankings,
        });
        info!(
            scope = %scope,
            candidates = rankings.len(),
            top_score = rankings.first().map(|ranked| ranked.overall_score),
            "ranking run completed"
        );

        let (event, audit_warning) = self.persist(AuditEventType::RankingRun, scope, payload, actor);
        Ok(Audited {
            result: rankings,
            event,
            audit_warning,
        })
    }

    /// Audit a batch of decision records and record an `audit_run` event.
    pub fn audit_fairness(
        &self,
        records: &[DecisionRecord],
        protected_attribute: &str,
        groups: &GroupConfig,
        actor: Option<&str>,
    ) -> Result<Audited<FairnessReport>, ServiceError> {
        let scope = AuditScope::fairness(protected_attribute);
        let audit = match self.auditor.audit(records, protected_attribute, groups) {
            Ok(audit) => audit,
            Err(err) => {
                match &err {
                    FairnessError::Internal { reason, fingerprint } => error!(
                        scope = %scope,
                        fingerprint = %fingerprint,
                        reason = %reason,
                        "fairness audit failed closed"
                    ),
                    other => info!(scope = %scope, error = %other, "fairness audit rejected"),
                }
                return Err(err.into());
            }
        };

        let report = audit.report;
        let payload = json!({
            "protected_attribute": audit.metrics.protected_attribute,
            "record_count": records.len(),
            "privileged": audit.metrics.privileged,
            "unprivileged": audit.metrics.unprivileged,
            "input_fingerprint": fingerprint(&(protected_attribute, groups, records)),
            "report": report,
        });
        info!(
            scope = %scope,
            records = records.len(),
            score = report.fairness_badge.score,
            grade = report.fairness_badge.grade.label(),
            bias_detected = report.bias_detected,
            "fairness audit completed"
        );

        let (event, audit_warning) = self.persist(AuditEventType::AuditRun, scope, payload, actor);
        Ok(Audited {
            result: report,
            event,
            audit_warning,
        })
    }

    /// Convert loosely-typed application objects, then audit them.
    pub fn audit_applications(
        &self,
        applications: &[Value],
        protected_attribute: &str,
        label: &FavorableLabel,
        groups: &GroupConfig,
        actor: Option<&str>,
    ) -> Result<Audited<FairnessReport>, ServiceError> {
        let records = records_from_applications(applications, protected_attribute, label)?;
        self.audit_fairness(&records, protected_attribute, groups, actor)
    }

    /// Newest events first; `limit` is capped at [`MAX_TIMELINE_LIMIT`].
    pub fn audit_timeline(
        &self,
        scope: &AuditScope,
        limit: usize,
    ) -> Result<Vec<AuditEvent>, AuditStoreError> {
        self.logger.timeline(scope, limit.min(MAX_TIMELINE_LIMIT))
    }

    fn persist(
        &self,
        event_type: AuditEventType,
        scope: AuditScope,
        payload: Value,
        actor: Option<&str>,
    ) -> (Option<AuditEvent>, Option<String>) {
        let actor = actor
            .map(str::trim)
            .filter(|actor| !actor.is_empty())
            .unwrap_or(self.default_actor.as_str());
        let scope_label = scope.to_string();

        match self.logger.record(event_type, scope, payload, actor) {
            Ok(event) => (Some(event), None),
            Err(err) => {
                warn!(
                    scope = %scope_label,
                    event_type = event_type.label(),
                    error = %err,
                    "audit log write failed; returning result without audit event"
                );
                (None, Some(format!("audit log write failed: {err}")))
            }
        }
    }
}
