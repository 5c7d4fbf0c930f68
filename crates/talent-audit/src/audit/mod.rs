//! Append-only audit trail for ranking and fairness runs.

pub mod domain;
pub mod logger;
pub mod store;

pub use domain::{AuditEvent, AuditEventId, AuditEventType, AuditScope};
pub use logger::AuditLogger;
pub use store::{AuditSink, AuditStoreError, InMemoryAuditLog, JsonLinesAuditLog};
