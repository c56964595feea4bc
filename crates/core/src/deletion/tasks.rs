//! Matching follow-up task notes against document numbers.

use billflow_shared::types::DocumentNumber;

/// Characters besides whitespace that delimit document numbers in
/// free-form task notes.
const SEPARATORS: [char; 5] = [',', ';', '/', ':', '|'];

/// Returns true if a free-form note references the given document number.
///
/// Notes come from humans and from templates, so the number may be wedged
/// between arbitrary separators ("pay FA-1, FA-2" or "proforma:FA-1").
/// Matching is on whole tokens, case-insensitive, so "FA-1" never matches
/// inside "FA-12".
#[must_use]
pub fn note_references_number(note: &str, number: &DocumentNumber) -> bool {
    let wanted = number.as_str().trim();
    if wanted.is_empty() {
        return false;
    }

    note.split(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .any(|token| token.eq_ignore_ascii_case(wanted))
}
