//! Accounting-backend contract: document creation, lookup, and deletion.

use async_trait::async_trait;
use billflow_shared::types::{Currency, DealId, DocumentId, DocumentNumber};
use chrono::NaiveDate;

use crate::deal::BillingKind;
use crate::document::{Buyer, Document, LineItem};

use super::GatewayError;

/// Reference to a bank account configured in the accounting backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankAccountRef {
    /// Account identifier in the accounting backend.
    pub id: String,
    /// Currency the account is denominated in.
    pub currency: Currency,
}

/// Payload for creating a document in the accounting backend.
#[derive(Debug, Clone)]
pub struct CreateDocumentRequest {
    /// Deal this document is issued for.
    pub deal_id: DealId,
    /// Kind of document requested on the deal.
    pub kind: BillingKind,
    /// Merged buyer snapshot.
    pub buyer: Buyer,
    /// Line items (name, quantity, unit price).
    pub line_items: Vec<LineItem>,
    /// Document currency.
    pub currency: Currency,
    /// Issue date; the payment schedule is derived from this date.
    pub issue_date: NaiveDate,
    /// Due date of the first (or only) installment.
    pub due_date: NaiveDate,
    /// Bank account to print on the document.
    pub bank_account: BankAccountRef,
    /// Free-form description, e.g. the installment summary.
    pub description: String,
}

/// Identifiers assigned by the accounting backend on creation.
///
/// The human-readable number may be absent immediately after creation;
/// the id is always present and authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedDocument {
    /// Backend-assigned document identifier.
    pub id: DocumentId,
    /// Backend-assigned document number, if already available.
    pub number: Option<DocumentNumber>,
}

/// External system of record for financial documents.
#[async_trait]
pub trait AccountingBackend: Send + Sync {
    /// Creates a document and returns its backend-assigned identifiers.
    async fn create_document(
        &self,
        request: &CreateDocumentRequest,
    ) -> Result<CreatedDocument, GatewayError>;

    /// Fetches a document by id. Returns `None` if it does not exist.
    async fn get_document(&self, id: &DocumentId) -> Result<Option<Document>, GatewayError>;

    /// Deletes a document by id.
    async fn delete_document(&self, id: &DocumentId) -> Result<(), GatewayError>;

    /// Returns the default bank account for the given currency.
    async fn default_bank_account(
        &self,
        currency: Currency,
    ) -> Result<BankAccountRef, GatewayError>;
}
