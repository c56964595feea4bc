//! Deal domain types.
//!
//! Deals are owned by the external trigger source; this engine never
//! creates one and mutates them only through field write-backs.

use billflow_shared::types::{DealId, DocumentId, DocumentNumber};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of financial document requested on a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingKind {
    /// Proforma invoice (payment request before delivery).
    Proforma,
    /// Final invoice.
    Invoice,
}

impl BillingKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Proforma => "proforma",
            Self::Invoice => "invoice",
        }
    }
}

impl std::fmt::Display for BillingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Billing-trigger state carried on the deal record.
///
/// The external system stores this as a small integer; the translation
/// to and from that encoding lives in [`crate::deal::fields`] and
/// nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingTrigger {
    /// No billing requested.
    Unset,
    /// A document of the given kind was requested and not yet produced.
    Requested(BillingKind),
    /// Processing complete; a document was produced for this trigger.
    Done,
}

impl BillingTrigger {
    /// Returns true if a document still needs to be produced.
    #[must_use]
    pub const fn is_requested(&self) -> bool {
        matches!(self, Self::Requested(_))
    }
}

/// Parsed deletion-trigger field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionRequest {
    /// Document numbers explicitly requested for deletion. Empty means
    /// "delete whatever is linked to the deal".
    pub requested_numbers: Vec<DocumentNumber>,
}

/// One source of buyer information on the deal (contact person or
/// organization record). All fields are best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSnapshot {
    /// Display name.
    pub name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Tax identifier.
    pub tax_id: Option<String>,
}

/// A deal record read from the trigger source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    /// External identifier.
    pub id: DealId,
    /// Deal title; used as the document line-item name.
    pub title: String,
    /// Deal amount in major currency units.
    pub amount: Decimal,
    /// Raw currency code; validated per deal, not at listing time.
    pub currency: String,
    /// Target close date, if set.
    pub close_date: Option<NaiveDate>,
    /// Billing-trigger state.
    pub billing_trigger: BillingTrigger,
    /// Last-known document id; may be stale.
    pub document_id: Option<DocumentId>,
    /// Historical document numbers recorded on the deal.
    pub document_numbers: Vec<DocumentNumber>,
    /// Deletion request, if the deletion trigger is set.
    pub deletion: Option<DeletionRequest>,
    /// Documents referenced by the explicit multi-value id field.
    pub deletion_document_ids: Vec<DocumentId>,
    /// Buyer information from the contact-person record.
    pub contact: Option<ContactSnapshot>,
    /// Buyer information from the organization record.
    pub organization: Option<ContactSnapshot>,
}

impl Deal {
    /// Returns true if a document still needs to be produced for this deal.
    #[must_use]
    pub const fn needs_billing(&self) -> bool {
        self.billing_trigger.is_requested()
    }

    /// Returns true if a deletion has been requested for this deal.
    #[must_use]
    pub const fn needs_deletion(&self) -> bool {
        self.deletion.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn deal() -> Deal {
        Deal {
            id: DealId::new("42"),
            title: "Spring campaign".to_string(),
            amount: dec!(1000),
            currency: "EUR".to_string(),
            close_date: None,
            billing_trigger: BillingTrigger::Unset,
            document_id: None,
            document_numbers: vec![],
            deletion: None,
            deletion_document_ids: vec![],
            contact: None,
            organization: None,
        }
    }

    #[test]
    fn test_needs_billing() {
        let mut d = deal();
        assert!(!d.needs_billing());

        d.billing_trigger = BillingTrigger::Requested(BillingKind::Proforma);
        assert!(d.needs_billing());

        d.billing_trigger = BillingTrigger::Done;
        assert!(!d.needs_billing());
    }

    #[test]
    fn test_needs_deletion() {
        let mut d = deal();
        assert!(!d.needs_deletion());

        d.deletion = Some(DeletionRequest::default());
        assert!(d.needs_deletion());
    }
}
