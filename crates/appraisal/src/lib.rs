pub mod config;
pub mod error;
pub mod import;
pub mod report;
pub mod telemetry;
pub mod valuation;
