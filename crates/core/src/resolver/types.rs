//! Resolution result types.

use billflow_shared::types::{DocumentId, DocumentNumber};
use serde::{Deserialize, Serialize};

use crate::document::Document;

/// Which lookup strategy confirmed the existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// The deal's last-known document id was re-validated successfully.
    DealField,
    /// The ledger holds an active document linked to the deal id.
    LedgerByDeal,
    /// The ledger holds an active document with a number recorded on the deal.
    LedgerByNumber,
}

impl ResolutionSource {
    /// Returns the string representation of the source.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DealField => "deal_field",
            Self::LedgerByDeal => "ledger_by_deal",
            Self::LedgerByNumber => "ledger_by_number",
        }
    }
}

/// An already-existing document confirmed for a deal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingDocument {
    /// Confirmed document id.
    pub document_id: DocumentId,
    /// Document number, if known.
    pub number: Option<DocumentNumber>,
    /// Strategy that confirmed the document.
    pub source: ResolutionSource,
    /// Full document as fetched from the backend when the ledger held no
    /// active row for it. The caller restores the ledger mirror from this
    /// copy before clearing the deal's trigger.
    pub backend_copy: Option<Document>,
}

/// Outcome of existing-document resolution for one deal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// The confirmed existing document, if any.
    pub existing: Option<ExistingDocument>,
    /// A document id recorded on the deal that no source could confirm.
    /// Reported separately so the caller can clear it; never cleared here.
    pub stale_document_id: Option<DocumentId>,
}

impl Resolution {
    /// Returns true if an existing document was confirmed.
    #[must_use]
    pub const fn found(&self) -> bool {
        self.existing.is_some()
    }
}
