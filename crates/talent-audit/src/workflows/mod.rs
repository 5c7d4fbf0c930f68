pub mod fairness;
pub mod ranking;
