//! Financial documents and buyer snapshots.

pub mod buyer;
pub mod types;

pub use buyer::merge_buyer;
pub use types::{Buyer, Document, DocumentStatus, LineItem};
