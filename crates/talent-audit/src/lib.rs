pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod telemetry;
pub mod workflows;
