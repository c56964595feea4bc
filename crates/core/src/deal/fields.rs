//! Wire encodings of the deal fields this engine reads and writes.
//!
//! The trigger source stores the billing trigger as a small integer, the
//! document-number history as a newline/comma-delimited list, and the
//! deletion trigger as a fixed string sentinel. Every translation between
//! those encodings and the typed domain model happens here and nowhere else.

use billflow_shared::types::{DocumentId, DocumentNumber};
use tracing::warn;

use super::types::{BillingKind, BillingTrigger, DeletionRequest};

/// Raw value: no billing requested.
pub const RAW_TRIGGER_UNSET: i32 = 0;
/// Raw value: proforma invoice requested.
pub const RAW_TRIGGER_PROFORMA: i32 = 1;
/// Raw value: final invoice requested.
pub const RAW_TRIGGER_INVOICE: i32 = 2;
/// Raw value: processing complete.
pub const RAW_TRIGGER_DONE: i32 = 9;

/// Fixed string sentinel for the deletion trigger, optionally followed by
/// `:` and a list of expected document numbers.
pub const DELETION_SENTINEL: &str = "delete";

/// Decodes the external integer billing-trigger encoding.
///
/// Unknown raw values decode to `Unset` and are logged, so one malformed
/// record cannot fail a whole listing.
#[must_use]
pub fn decode_trigger(raw: i32) -> BillingTrigger {
    match raw {
        RAW_TRIGGER_UNSET => BillingTrigger::Unset,
        RAW_TRIGGER_PROFORMA => BillingTrigger::Requested(BillingKind::Proforma),
        RAW_TRIGGER_INVOICE => BillingTrigger::Requested(BillingKind::Invoice),
        RAW_TRIGGER_DONE => BillingTrigger::Done,
        other => {
            warn!(raw = other, "unknown billing-trigger value, treating as unset");
            BillingTrigger::Unset
        }
    }
}

/// Encodes a billing trigger into the external integer encoding.
#[must_use]
pub const fn encode_trigger(trigger: &BillingTrigger) -> i32 {
    match trigger {
        BillingTrigger::Unset => RAW_TRIGGER_UNSET,
        BillingTrigger::Requested(BillingKind::Proforma) => RAW_TRIGGER_PROFORMA,
        BillingTrigger::Requested(BillingKind::Invoice) => RAW_TRIGGER_INVOICE,
        BillingTrigger::Done => RAW_TRIGGER_DONE,
    }
}

/// Splits a comma/newline-delimited list field into trimmed, de-duplicated,
/// non-empty entries, preserving first-seen order.
fn split_list(raw: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for part in raw.split([',', '\n', '\r']) {
        let trimmed = part.trim();
        if !trimmed.is_empty() && !seen.iter().any(|s| s == trimmed) {
            seen.push(trimmed.to_string());
        }
    }
    seen
}

/// Parses the newline/comma-delimited document-number field.
#[must_use]
pub fn parse_number_list(raw: &str) -> Vec<DocumentNumber> {
    split_list(raw).into_iter().map(DocumentNumber).collect()
}

/// Parses the newline/comma-delimited multi-value document-id field.
#[must_use]
pub fn parse_id_list(raw: &str) -> Vec<DocumentId> {
    split_list(raw).into_iter().map(DocumentId).collect()
}

/// Joins document numbers back into the newline-delimited wire form.
#[must_use]
pub fn join_number_list(numbers: &[DocumentNumber]) -> String {
    numbers
        .iter()
        .map(DocumentNumber::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decodes the deletion-trigger field.
///
/// Recognized forms: empty (no request), `delete`, and
/// `delete:<numbers>` where `<numbers>` is a comma/newline list of
/// expected document numbers. Anything else is not a deletion request.
#[must_use]
pub fn decode_deletion_field(raw: &str) -> Option<DeletionRequest> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.eq_ignore_ascii_case(DELETION_SENTINEL) {
        return Some(DeletionRequest::default());
    }

    let (head, tail) = trimmed.split_once(':')?;
    if !head.trim().eq_ignore_ascii_case(DELETION_SENTINEL) {
        warn!(raw = trimmed, "unrecognized deletion-trigger value, ignoring");
        return None;
    }

    Some(DeletionRequest {
        requested_numbers: parse_number_list(tail),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_roundtrip() {
        for raw in [
            RAW_TRIGGER_UNSET,
            RAW_TRIGGER_PROFORMA,
            RAW_TRIGGER_INVOICE,
            RAW_TRIGGER_DONE,
        ] {
            assert_eq!(encode_trigger(&decode_trigger(raw)), raw);
        }
    }

    #[test]
    fn test_unknown_trigger_decodes_to_unset() {
        assert_eq!(decode_trigger(7), BillingTrigger::Unset);
        assert_eq!(decode_trigger(-1), BillingTrigger::Unset);
    }

    #[test]
    fn test_parse_number_list_separators() {
        let numbers = parse_number_list("FA-1, FA-2\nFA-3\r\nFA-4");
        let raw: Vec<&str> = numbers.iter().map(DocumentNumber::as_str).collect();
        assert_eq!(raw, vec!["FA-1", "FA-2", "FA-3", "FA-4"]);
    }

    #[test]
    fn test_parse_number_list_dedupes_and_skips_empty() {
        let numbers = parse_number_list("FA-1,,FA-1,\n ,FA-2");
        let raw: Vec<&str> = numbers.iter().map(DocumentNumber::as_str).collect();
        assert_eq!(raw, vec!["FA-1", "FA-2"]);
    }

    #[test]
    fn test_join_number_list() {
        let numbers = vec![DocumentNumber::new("FA-1"), DocumentNumber::new("FA-2")];
        assert_eq!(join_number_list(&numbers), "FA-1\nFA-2");
        assert_eq!(join_number_list(&[]), "");
    }

    #[test]
    fn test_decode_deletion_field_bare_sentinel() {
        let request = decode_deletion_field("delete").unwrap();
        assert!(request.requested_numbers.is_empty());

        let request = decode_deletion_field(" DELETE ").unwrap();
        assert!(request.requested_numbers.is_empty());
    }

    #[test]
    fn test_decode_deletion_field_with_numbers() {
        let request = decode_deletion_field("delete: FA-1, FA-2").unwrap();
        let raw: Vec<&str> = request
            .requested_numbers
            .iter()
            .map(DocumentNumber::as_str)
            .collect();
        assert_eq!(raw, vec!["FA-1", "FA-2"]);
    }

    #[test]
    fn test_decode_deletion_field_rejects_other_values() {
        assert!(decode_deletion_field("").is_none());
        assert!(decode_deletion_field("archive").is_none());
        assert!(decode_deletion_field("remove: FA-1").is_none());
    }
}
