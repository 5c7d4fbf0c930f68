use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditEventId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    RankingRun,
    AuditRun,
}

impl AuditEventType {
    pub const fn label(self) -> &'static str {
        match self {
            AuditEventType::RankingRun => "ranking_run",
            AuditEventType::AuditRun => "audit_run",
        }
    }
}

/// What a run was about: `job:<id>` for rankings, `audit:<attribute>` for fairness audits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditScope(pub String);

impl AuditScope {
    pub fn job(job_id: &str) -> Self {
        Self(format!("job:{}", job_id.trim()))
    }

    pub fn fairness(protected_attribute: &str) -> Self {
        Self(format!("audit:{}", protected_attribute.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuditScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable record of one completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: AuditEventId,
    pub event_type: AuditEventType,
    pub timestamp: DateTime<Utc>,
    pub scope: AuditScope,
    pub payload: Value,
    pub actor: String,
}
