//! Trigger-source contract: deal listing, field write-back, follow-up tasks.

use async_trait::async_trait;
use billflow_shared::types::{DealId, DocumentId, DocumentNumber};

use crate::deal::{BillingTrigger, Deal};

use super::GatewayError;

/// Field patch written back to a deal record.
///
/// Only the fields that are set are written; the write-back layer drops
/// fields whose value is already known to be current, so an all-empty patch
/// is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DealPatch {
    /// New billing-trigger value, e.g. the "done" sentinel.
    pub billing_trigger: Option<BillingTrigger>,
    /// New last-known document id.
    pub document_id: Option<DocumentId>,
    /// Clears a stale document id from the deal record.
    pub clear_document_id: bool,
    /// Replaces the historical document-number list.
    pub document_numbers: Option<Vec<DocumentNumber>>,
    /// Clears the deletion-trigger field after a fully successful deletion.
    pub clear_deletion_trigger: bool,
}

impl DealPatch {
    /// Returns true if the patch writes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.billing_trigger.is_none()
            && self.document_id.is_none()
            && !self.clear_document_id
            && self.document_numbers.is_none()
            && !self.clear_deletion_trigger
    }
}

/// An open follow-up task attached to a deal in the trigger source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpTask {
    /// Task identifier in the trigger source.
    pub id: String,
    /// Free-form note or description; may reference document numbers.
    pub note: String,
}

/// External relationship-management system carrying the billing and
/// deletion flags this engine reacts to.
#[async_trait]
pub trait TriggerSource: Send + Sync {
    /// Lists open deals with a non-empty billing or deletion trigger.
    async fn list_billable_deals(&self) -> Result<Vec<Deal>, GatewayError>;

    /// Writes the given field patch to a deal record.
    async fn update_deal(&self, id: &DealId, patch: &DealPatch) -> Result<(), GatewayError>;

    /// Lists open follow-up tasks attached to a deal.
    async fn list_open_tasks(&self, deal_id: &DealId) -> Result<Vec<FollowUpTask>, GatewayError>;

    /// Marks a follow-up task as complete.
    async fn complete_task(&self, task_id: &str) -> Result<(), GatewayError>;
}
