//! Per-run cache for backend document-number lookups.
//!
//! When a document id is known but its number is not, the resolver fetches
//! the full document from the accounting backend once to learn the number.
//! This cache keeps that answer for the rest of the run so the fetch
//! happens at most once per creation, not on every poll.

use billflow_shared::types::{DocumentId, DocumentNumber};
use moka::sync::Cache;

/// Default cache capacity (number of entries).
const DEFAULT_CACHE_CAPACITY: u64 = 1024;

/// Per-run cache mapping document ids to their backend-assigned numbers.
///
/// Constructed once per reconciliation run and passed by reference;
/// deliberately not a module-level singleton, so a long-lived stale cache
/// can never mask a renumbered document across runs.
#[derive(Clone)]
pub struct DocumentNumberCache {
    cache: Cache<DocumentId, DocumentNumber>,
}

impl DocumentNumberCache {
    /// Creates an empty cache with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::new(DEFAULT_CACHE_CAPACITY),
        }
    }

    /// Returns the cached number for a document id, if present.
    #[must_use]
    pub fn get(&self, id: &DocumentId) -> Option<DocumentNumber> {
        self.cache.get(id)
    }

    /// Records the number for a document id.
    pub fn insert(&self, id: DocumentId, number: DocumentNumber) {
        self.cache.insert(id, number);
    }

    /// Returns the number of entries currently cached.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl Default for DocumentNumberCache {
    fn default() -> Self {
        Self::new()
    }
}
