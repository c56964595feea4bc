//! Per-deal processing errors.

use billflow_shared::error::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::gateway::GatewayError;

/// Deal data that cannot produce a valid document.
///
/// Validation failures are permanent until a human fixes the deal record;
/// the trigger stays set so the deal is retried once the data changes.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The deal's currency is not one the system can issue documents in.
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    /// The deal amount is zero or negative.
    #[error("Deal amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Neither the contact person nor the organization has a usable name.
    #[error("No usable buyer name on the deal")]
    MissingBuyer,

    /// The merged buyer has no email address.
    #[error("Buyer has no email address")]
    MissingBuyerEmail,
}

/// Anything that can stop one deal from being processed.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The deal record is not billable as-is.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A collaborator call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ProcessError {
    /// Returns true if reprocessing the deal unchanged may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Gateway(error) if error.is_transient())
    }
}

impl From<ProcessError> for AppError {
    fn from(error: ProcessError) -> Self {
        match error {
            ProcessError::Validation(validation) => Self::Validation(validation.to_string()),
            ProcessError::Gateway(gateway) => gateway.into(),
        }
    }
}
