use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use talent_audit::audit::{
    AuditEvent, AuditScope, AuditSink, AuditStoreError, InMemoryAuditLog, JsonLinesAuditLog,
};
use talent_audit::config::{AppConfig, AuditConfig};
use talent_audit::engine::TalentAuditService;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Audit sink chosen at startup from `AUDIT_LOG_PATH`.
pub(crate) enum ConfiguredAuditSink {
    Memory(InMemoryAuditLog),
    File(JsonLinesAuditLog),
}

impl ConfiguredAuditSink {
    pub(crate) fn from_config(config: &AuditConfig) -> Self {
        match &config.log_path {
            Some(path) => Self::File(JsonLinesAuditLog::new(path.clone())),
            None => Self::Memory(InMemoryAuditLog::new()),
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Memory(_) => "in-memory".to_string(),
            Self::File(log) => log.path().display().to_string(),
        }
    }
}

impl AuditSink for ConfiguredAuditSink {
    fn append(&self, event: &AuditEvent) -> Result<(), AuditStoreError> {
        match self {
            Self::Memory(log) => log.append(event),
            Self::File(log) => log.append(event),
        }
    }

    fn timeline(&self, scope: &AuditScope, limit: usize) -> Result<Vec<AuditEvent>, AuditStoreError> {
        match self {
            Self::Memory(log) => log.timeline(scope, limit),
            Self::File(log) => log.timeline(scope, limit),
        }
    }
}

pub(crate) fn build_service(config: &AppConfig) -> TalentAuditService<ConfiguredAuditSink> {
    let sink = Arc::new(ConfiguredAuditSink::from_config(&config.audit));
    TalentAuditService::new(sink, config.engine.clone(), config.audit.default_actor.clone())
}
