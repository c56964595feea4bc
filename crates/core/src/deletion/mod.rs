//! Multi-system document deletion with audit logging.

pub mod service;
pub mod tasks;
pub mod types;

pub use service::DeletionResolver;
pub use tasks::note_references_number;
pub use types::{CandidateResult, DeletionLogEntry, DeletionOutcome, DeletionReport};
