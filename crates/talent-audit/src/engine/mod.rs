//! Service facade and HTTP adapter over the ranking and fairness cores.
//!
//! Computation and audit persistence are separate failure domains: a failed audit write
//! never discards a computed result, it is reported alongside it as `audit_warning`.

pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use router::engine_router;
pub use service::{
    Audited, ServiceError, TalentAuditService, DEFAULT_TIMELINE_LIMIT, MAX_TIMELINE_LIMIT,
};
