//! Existing-document resolver.
//!
//! Before a document is created for a deal, this resolver decides whether
//! one already exists, consulting the three sources of truth in precedence
//! order. The strategies short-circuit on the first hit; a lookup failure
//! on one source is logged and treated as "not found from that source",
//! never as a reason to block creation indefinitely.

use std::slice;
use std::time::Duration;

use billflow_shared::types::DocumentId;
use tracing::{debug, warn};

use crate::deal::Deal;
use crate::gateway::{AccountingBackend, LedgerStore, with_timeout};

use super::cache::DocumentNumberCache;
use super::types::{ExistingDocument, Resolution, ResolutionSource};

/// Outcome of re-validating the deal's last-known document id.
enum Revalidation {
    /// A source confirmed the document exists and is not deleted.
    Confirmed(ExistingDocument),
    /// A source definitively answered that the document is gone or deleted.
    Absent,
    /// No source could answer; the id must not be treated as stale.
    Unknown,
}

/// Read-only resolver deciding whether a deal already has a document.
pub struct ExistingDocumentResolver<'a, L, A> {
    ledger: &'a L,
    backend: &'a A,
    number_cache: &'a DocumentNumberCache,
    timeout: Duration,
}

impl<'a, L, A> ExistingDocumentResolver<'a, L, A>
where
    L: LedgerStore,
    A: AccountingBackend,
{
    /// Creates a resolver borrowing the run's collaborators and cache.
    pub const fn new(
        ledger: &'a L,
        backend: &'a A,
        number_cache: &'a DocumentNumberCache,
        timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            backend,
            number_cache,
            timeout,
        }
    }

    /// Resolves whether a document already exists for the deal.
    ///
    /// Strategies in precedence order, short-circuiting on first hit:
    /// 1. re-validate the deal's last-known document id (ledger, then
    ///    backend);
    /// 2. ledger lookup by deal id, independent of the id on the deal;
    /// 3. ledger search by a document number recorded on the deal.
    ///
    /// A last-known id confirmed by no source is reported via
    /// `stale_document_id` so the caller can clear it.
    pub async fn resolve(&self, deal: &Deal) -> Resolution {
        let mut stale_candidate = None;

        if let Some(id) = &deal.document_id {
            match self.revalidate_deal_field(id).await {
                Revalidation::Confirmed(existing) => {
                    return Resolution {
                        existing: Some(self.backfill_number(existing).await),
                        stale_document_id: None,
                    };
                }
                Revalidation::Absent => {
                    debug!(deal_id = %deal.id, document_id = %id, "last-known document id is stale");
                    stale_candidate = Some(id.clone());
                }
                Revalidation::Unknown => {
                    debug!(
                        deal_id = %deal.id,
                        document_id = %id,
                        "could not re-validate last-known document id, leaving it in place"
                    );
                }
            }
        }

        if let Some(existing) = self.lookup_by_deal(deal).await {
            let stale = stale_candidate.filter(|id| *id != existing.document_id);
            return Resolution {
                existing: Some(self.backfill_number(existing).await),
                stale_document_id: stale,
            };
        }

        if let Some(existing) = self.lookup_by_numbers(deal).await {
            let stale = stale_candidate.filter(|id| *id != existing.document_id);
            return Resolution {
                existing: Some(self.backfill_number(existing).await),
                stale_document_id: stale,
            };
        }

        Resolution {
            existing: None,
            stale_document_id: stale_candidate,
        }
    }

    /// Strategy 1: re-validate the deal's last-known document id.
    async fn revalidate_deal_field(&self, id: &DocumentId) -> Revalidation {
        match with_timeout(
            self.timeout,
            "ledger find_by_ids",
            self.ledger.find_by_ids(slice::from_ref(id)),
        )
        .await
        {
            Ok(docs) => {
                if let Some(doc) = docs.iter().find(|d| d.is_active()) {
                    return Revalidation::Confirmed(ExistingDocument {
                        document_id: doc.id.clone(),
                        number: doc.number.clone(),
                        source: ResolutionSource::DealField,
                        backend_copy: None,
                    });
                }
                if !docs.is_empty() {
                    // Known to the ledger and already deleted.
                    return Revalidation::Absent;
                }
            }
            Err(error) => {
                warn!(document_id = %id, %error, "ledger lookup failed during re-validation");
            }
        }

        match with_timeout(
            self.timeout,
            "backend get_document",
            self.backend.get_document(id),
        )
        .await
        {
            Ok(Some(doc)) if doc.is_active() => Revalidation::Confirmed(ExistingDocument {
                document_id: doc.id.clone(),
                number: doc.number.clone(),
                source: ResolutionSource::DealField,
                // The ledger could not confirm this document, so its
                // mirror row is missing or unreadable. Carry the backend's
                // copy so the caller can restore it.
                backend_copy: Some(doc),
            }),
            Ok(_) => Revalidation::Absent,
            Err(error) => {
                // The backend is the authority on existence; without an
                // answer from it the id stays unconfirmed, never stale.
                warn!(document_id = %id, %error, "backend lookup failed during re-validation");
                Revalidation::Unknown
            }
        }
    }

    /// Strategy 2: any active ledger document linked to this deal id.
    ///
    /// Covers the case where a previous run created the document but the
    /// field write-back failed, a classic at-least-once delivery hazard.
    async fn lookup_by_deal(&self, deal: &Deal) -> Option<ExistingDocument> {
        match with_timeout(
            self.timeout,
            "ledger find_by_deal_id",
            self.ledger.find_by_deal_id(&deal.id),
        )
        .await
        {
            Ok(docs) => docs
                .into_iter()
                .find(|doc| doc.is_active())
                .map(|doc| ExistingDocument {
                    document_id: doc.id,
                    number: doc.number,
                    source: ResolutionSource::LedgerByDeal,
                    backend_copy: None,
                }),
            Err(error) => {
                warn!(deal_id = %deal.id, %error, "ledger lookup by deal id failed");
                None
            }
        }
    }

    /// Strategy 3: ledger search by a document number recorded on the deal.
    async fn lookup_by_numbers(&self, deal: &Deal) -> Option<ExistingDocument> {
        if deal.document_numbers.is_empty() {
            return None;
        }

        match with_timeout(
            self.timeout,
            "ledger find_by_numbers",
            self.ledger.find_by_numbers(&deal.document_numbers),
        )
        .await
        {
            Ok(docs) => docs
                .into_iter()
                .find(|doc| doc.is_active())
                .map(|doc| ExistingDocument {
                    document_id: doc.id,
                    number: doc.number,
                    source: ResolutionSource::LedgerByNumber,
                    backend_copy: None,
                }),
            Err(error) => {
                warn!(deal_id = %deal.id, %error, "ledger lookup by numbers failed");
                None
            }
        }
    }

    /// Learns a missing document number from the backend, at most once per
    /// run per document id.
    async fn backfill_number(&self, mut existing: ExistingDocument) -> ExistingDocument {
        if existing.number.is_some() {
            return existing;
        }

        if let Some(number) = self.number_cache.get(&existing.document_id) {
            existing.number = Some(number);
            return existing;
        }

        match with_timeout(
            self.timeout,
            "backend get_document",
            self.backend.get_document(&existing.document_id),
        )
        .await
        {
            Ok(Some(doc)) => {
                if let Some(number) = doc.number {
                    self.number_cache
                        .insert(existing.document_id.clone(), number.clone());
                    existing.number = Some(number);
                }
            }
            Ok(None) => {
                warn!(
                    document_id = %existing.document_id,
                    "document missing from backend while learning its number"
                );
            }
            Err(error) => {
                warn!(
                    document_id = %existing.document_id,
                    %error,
                    "could not learn document number from backend"
                );
            }
        }

        existing
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use billflow_shared::types::{DocumentId, DocumentNumber};

    use crate::document::DocumentStatus;
    use crate::test_support::{FakeBackend, InMemoryLedger, deal, document};

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_confirms_last_known_id_via_ledger() {
        let ledger = InMemoryLedger::with_documents(vec![document("D1", "42", Some("FA-1"))]);
        let backend = FakeBackend::default();
        let cache = DocumentNumberCache::new();
        let resolver = ExistingDocumentResolver::new(&ledger, &backend, &cache, TIMEOUT);

        let mut d = deal("42");
        d.document_id = Some(DocumentId::new("D1"));
        let resolution = resolver.resolve(&d).await;

        let existing = resolution.existing.unwrap();
        assert_eq!(existing.document_id, DocumentId::new("D1"));
        assert_eq!(existing.number, Some(DocumentNumber::new("FA-1")));
        assert_eq!(existing.source, ResolutionSource::DealField);
        assert!(existing.backend_copy.is_none());
        assert!(resolution.stale_document_id.is_none());
        // Confirmed by the ledger, so the backend was never asked.
        assert_eq!(backend.get_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_backend_confirmation_carries_the_missing_mirror() {
        // The ledger lost (or never got) the mirror row; only the backend
        // still knows the document.
        let doc = document("D1", "42", Some("FA-1"));
        let ledger = InMemoryLedger::default();
        let backend = FakeBackend::with_documents(vec![doc.clone()]);
        let cache = DocumentNumberCache::new();
        let resolver = ExistingDocumentResolver::new(&ledger, &backend, &cache, TIMEOUT);

        let mut d = deal("42");
        d.document_id = Some(DocumentId::new("D1"));
        let resolution = resolver.resolve(&d).await;

        let existing = resolution.existing.unwrap();
        assert_eq!(existing.source, ResolutionSource::DealField);
        assert_eq!(existing.backend_copy, Some(doc));
    }

    #[tokio::test]
    async fn test_deleted_document_makes_the_id_stale() {
        let mut doc = document("D1", "42", Some("FA-1"));
        doc.status = DocumentStatus::Deleted;
        let ledger = InMemoryLedger::with_documents(vec![doc]);
        let backend = FakeBackend::default();
        let cache = DocumentNumberCache::new();
        let resolver = ExistingDocumentResolver::new(&ledger, &backend, &cache, TIMEOUT);

        let mut d = deal("42");
        d.document_id = Some(DocumentId::new("D1"));
        let resolution = resolver.resolve(&d).await;

        assert!(!resolution.found());
        assert_eq!(resolution.stale_document_id, Some(DocumentId::new("D1")));
    }

    #[tokio::test]
    async fn test_backend_outage_keeps_the_id_unconfirmed() {
        let ledger = InMemoryLedger::default();
        let backend = FakeBackend::default();
        backend.fail_get.store(true, Ordering::SeqCst);
        let cache = DocumentNumberCache::new();
        let resolver = ExistingDocumentResolver::new(&ledger, &backend, &cache, TIMEOUT);

        let mut d = deal("42");
        d.document_id = Some(DocumentId::new("D1"));
        let resolution = resolver.resolve(&d).await;

        // No source could answer; the id must not be reported stale.
        assert!(!resolution.found());
        assert!(resolution.stale_document_id.is_none());
    }

    #[tokio::test]
    async fn test_finds_document_linked_to_the_deal() {
        let ledger = InMemoryLedger::with_documents(vec![document("D2", "42", Some("FA-2"))]);
        let backend = FakeBackend::default();
        let cache = DocumentNumberCache::new();
        let resolver = ExistingDocumentResolver::new(&ledger, &backend, &cache, TIMEOUT);

        let resolution = resolver.resolve(&deal("42")).await;

        let existing = resolution.existing.unwrap();
        assert_eq!(existing.document_id, DocumentId::new("D2"));
        assert_eq!(existing.source, ResolutionSource::LedgerByDeal);
    }

    #[tokio::test]
    async fn test_finds_document_by_recorded_number() {
        // Linked to a different deal in the ledger, reachable only through
        // the number history on this deal.
        let ledger = InMemoryLedger::with_documents(vec![document("D3", "99", Some("FA-3"))]);
        let backend = FakeBackend::default();
        let cache = DocumentNumberCache::new();
        let resolver = ExistingDocumentResolver::new(&ledger, &backend, &cache, TIMEOUT);

        let mut d = deal("42");
        d.document_numbers = vec![DocumentNumber::new("FA-3")];
        let resolution = resolver.resolve(&d).await;

        let existing = resolution.existing.unwrap();
        assert_eq!(existing.document_id, DocumentId::new("D3"));
        assert_eq!(existing.source, ResolutionSource::LedgerByNumber);
    }

    #[tokio::test]
    async fn test_stale_id_reported_alongside_the_replacement() {
        let ledger = InMemoryLedger::with_documents(vec![document("D1", "42", Some("FA-1"))]);
        let backend = FakeBackend::default();
        let cache = DocumentNumberCache::new();
        let resolver = ExistingDocumentResolver::new(&ledger, &backend, &cache, TIMEOUT);

        let mut d = deal("42");
        d.document_id = Some(DocumentId::new("D9"));
        let resolution = resolver.resolve(&d).await;

        let existing = resolution.existing.unwrap();
        assert_eq!(existing.document_id, DocumentId::new("D1"));
        assert_eq!(resolution.stale_document_id, Some(DocumentId::new("D9")));
    }

    #[tokio::test]
    async fn test_missing_number_backfilled_from_backend_once() {
        let ledger = InMemoryLedger::with_documents(vec![document("D1", "42", None)]);
        let backend = FakeBackend::with_documents(vec![document("D1", "42", Some("FA-1"))]);
        let cache = DocumentNumberCache::new();
        let resolver = ExistingDocumentResolver::new(&ledger, &backend, &cache, TIMEOUT);

        let first = resolver.resolve(&deal("42")).await;
        assert_eq!(
            first.existing.unwrap().number,
            Some(DocumentNumber::new("FA-1"))
        );

        let second = resolver.resolve(&deal("42")).await;
        assert_eq!(
            second.existing.unwrap().number,
            Some(DocumentNumber::new("FA-1"))
        );
        assert_eq!(backend.get_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_nothing_found_anywhere() {
        let ledger = InMemoryLedger::default();
        let backend = FakeBackend::default();
        let cache = DocumentNumberCache::new();
        let resolver = ExistingDocumentResolver::new(&ledger, &backend, &cache, TIMEOUT);

        let resolution = resolver.resolve(&deal("42")).await;

        assert!(!resolution.found());
        assert!(resolution.stale_document_id.is_none());
    }
}
