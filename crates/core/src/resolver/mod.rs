//! Existing-document resolution before creation.

pub mod cache;
pub mod service;
pub mod types;

pub use cache::DocumentNumberCache;
pub use service::ExistingDocumentResolver;
pub use types::{ExistingDocument, Resolution, ResolutionSource};
