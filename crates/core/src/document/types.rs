//! Document domain types.

use billflow_shared::types::{DealId, DocumentId, DocumentNumber, Money};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a document in the local ledger.
///
/// Documents are never hard-deleted; history is append-only via this
/// status plus the deletion log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// The document exists in the accounting backend.
    Active,
    /// The document was retracted from the accounting backend.
    Deleted,
}

impl DocumentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Buyer snapshot printed on the document.
///
/// Best-effort merge of the deal's contact-person and organization records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buyer {
    /// Buyer display name.
    pub name: String,
    /// Email address; required for issuance.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Tax identifier.
    pub tax_id: Option<String>,
}

/// One document line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item name.
    pub name: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit price in major currency units.
    pub unit_price: Decimal,
}

/// A financial document (proforma or invoice) mirrored in the local ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier assigned by the accounting backend. Immutable once set.
    pub id: DocumentId,
    /// Human-readable number assigned by the backend; may be absent
    /// immediately after creation.
    pub number: Option<DocumentNumber>,
    /// Deal this document was issued for.
    pub deal_id: DealId,
    /// Total amount with currency.
    pub total: Money,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Buyer snapshot at issuance time.
    pub buyer: Buyer,
    /// Line items.
    pub line_items: Vec<LineItem>,
    /// Lifecycle status.
    pub status: DocumentStatus,
}

impl Document {
    /// Returns true if the document has not been retracted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == DocumentStatus::Active
    }
}
