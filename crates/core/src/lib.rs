//! Reconciliation and idempotency engine for Billflow.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. The three external collaborators (trigger source,
//! accounting backend, local ledger) are reached only through the
//! async traits in [`gateway`].
//!
//! # Modules
//!
//! - `deal` - Deal records and the external field encodings
//! - `document` - Financial documents and buyer snapshots
//! - `schedule` - Payment schedule calculation
//! - `resolver` - Existing-document resolution before creation
//! - `deletion` - Multi-system document deletion with audit logging
//! - `sync` - Idempotent trigger-source write-back with retry
//! - `driver` - Per-deal reconciliation orchestration
//! - `gateway` - Collaborator traits and error taxonomy

pub mod deal;
pub mod deletion;
pub mod document;
pub mod driver;
pub mod gateway;
pub mod resolver;
pub mod schedule;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;
