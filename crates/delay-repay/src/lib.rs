pub mod config;
pub mod eligibility;
pub mod error;
pub mod performance;
pub mod reference;
pub mod telemetry;
