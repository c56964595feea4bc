//! Common types used across the application.

pub mod id;
pub mod money;

pub use id::{DealId, DocumentId, DocumentNumber};
pub use money::{Currency, Money};
