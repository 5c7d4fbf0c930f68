use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use super::domain::{AuditEvent, AuditEventId, AuditEventType, AuditScope};
use super::store::{AuditSink, AuditStoreError};

/// Ids stay unique across processes writing to the same log file.
fn next_event_id() -> AuditEventId {
    AuditEventId(format!("evt-{}", Uuid::new_v4().simple()))
}

/// Stamps and appends audit events; the sink decides where they live.
pub struct AuditLogger<S> {
    sink: Arc<S>,
}

impl<S> Clone for AuditLogger<S> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S> AuditLogger<S>
where
    S: AuditSink + 'static,
{
    pub fn new(sink: Arc<S>) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &Arc<S> {
        &self.sink
    }

    /// Build the event at call time and append it. The event is returned only once stored.
    pub fn record(
        &self,
        event_type: AuditEventType,
        scope: AuditScope,
        payload: Value,
        actor: &str,
    ) -> Result<AuditEvent, AuditStoreError> {
        let event = AuditEvent {
            id: next_event_id(),
            event_type,
            timestamp: Utc::now(),
            scope,
            payload,
            actor: actor.to_string(),
        };
        self.sink.append(&event)?;
        Ok(event)
    }

    pub fn timeline(
        &self,
        scope: &AuditScope,
        limit: usize,
    ) -> Result<Vec<AuditEvent>, AuditStoreError> {
        self.sink.timeline(scope, limit)
    }
}
