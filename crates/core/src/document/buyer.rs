//! Best-effort merge of the two buyer-information sources on a deal.

use crate::deal::ContactSnapshot;

use super::types::Buyer;

fn filled(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn first_filled(primary: Option<&String>, secondary: Option<&String>) -> Option<String> {
    filled(primary).or_else(|| filled(secondary))
}

/// Merges the contact-person and organization records into one buyer
/// snapshot.
///
/// The organization wins for name, address, and tax id; the contact
/// person wins for email and phone. Returns `None` when neither source
/// provides a usable name.
#[must_use]
pub fn merge_buyer(
    contact: Option<&ContactSnapshot>,
    organization: Option<&ContactSnapshot>,
) -> Option<Buyer> {
    let empty = ContactSnapshot::default();
    let contact = contact.unwrap_or(&empty);
    let organization = organization.unwrap_or(&empty);

    let name = first_filled(organization.name.as_ref(), contact.name.as_ref())?;

    Some(Buyer {
        name,
        email: first_filled(contact.email.as_ref(), organization.email.as_ref()),
        phone: first_filled(contact.phone.as_ref(), organization.phone.as_ref()),
        address: first_filled(organization.address.as_ref(), contact.address.as_ref()),
        tax_id: first_filled(organization.tax_id.as_ref(), contact.tax_id.as_ref()),
    })
}
