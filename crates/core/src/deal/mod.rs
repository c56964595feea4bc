//! Deal records and the external field encodings.

pub mod fields;
pub mod types;

pub use fields::{
    decode_deletion_field, decode_trigger, encode_trigger, join_number_list, parse_id_list,
    parse_number_list,
};
pub use types::{BillingKind, BillingTrigger, ContactSnapshot, Deal, DeletionRequest};
