//! Repository abstractions for data access.

pub mod document;

pub use document::DocumentRepository;
