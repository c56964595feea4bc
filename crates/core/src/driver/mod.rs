//! Per-deal reconciliation orchestration.

pub mod cache;
pub mod error;
pub mod service;


pub use cache::BankAccountCache;
pub use error::{ProcessError, ValidationError};
pub use service::{DealOutcome, DriverSettings, ReconciliationDriver, RunSummary};
