//! Collaborator traits and error taxonomy.
//!
//! The engine talks to three external systems: the trigger source
//! (relationship-management records), the accounting backend (document
//! creation and deletion), and the local ledger (persistence). Each is
//! reached only through the async traits defined here, so the engine can
//! run against real adapters or in-memory fakes.

pub mod accounting;
pub mod ledger;
pub mod trigger;

use std::future::Future;
use std::time::Duration;

use billflow_shared::error::AppError;
use thiserror::Error;

pub use accounting::{AccountingBackend, BankAccountRef, CreateDocumentRequest, CreatedDocument};
pub use ledger::LedgerStore;
pub use trigger::{DealPatch, FollowUpTask, TriggerSource};

/// Errors returned by collaborator calls.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transient failure (network, timeout, rate limit). Safe to retry.
    #[error("Transient collaborator error: {0}")]
    Transient(String),

    /// The referenced record does not exist on the collaborator.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The collaborator answered with something the adapter cannot interpret.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl GatewayError {
    /// Returns true if the call that produced this error may be retried.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<GatewayError> for AppError {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::Transient(msg) => Self::Transient(msg),
            GatewayError::NotFound(msg) => Self::NotFound(msg),
            GatewayError::Protocol(msg) => Self::ExternalService(msg),
        }
    }
}

/// Wraps an outbound collaborator call in a bounded timeout.
///
/// An elapsed timer is reported as a transient error, never a permanent one.
pub async fn with_timeout<T, F>(
    timeout: Duration,
    context: &str,
    future: F,
) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(GatewayError::Transient(format!(
            "{context}: timed out after {}s",
            timeout.as_secs()
        ))),
    }
}
