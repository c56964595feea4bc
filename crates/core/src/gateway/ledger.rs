//! Local-ledger contract: the engine's own persistence store.

use async_trait::async_trait;
use billflow_shared::types::{DealId, DocumentId, DocumentNumber};

use crate::deletion::DeletionLogEntry;
use crate::document::Document;

use super::GatewayError;

/// Persistence store mirroring created documents and deletion history.
///
/// All mutations are upserts keyed by document id, never blind inserts,
/// so interrupted runs can repeat completed side effects safely. The
/// deletion log is append-only.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Returns all documents linked to the given deal, any status.
    async fn find_by_deal_id(&self, deal_id: &DealId) -> Result<Vec<Document>, GatewayError>;

    /// Returns the documents with the given ids, any status.
    async fn find_by_ids(&self, ids: &[DocumentId]) -> Result<Vec<Document>, GatewayError>;

    /// Returns the documents carrying the given numbers, any status.
    async fn find_by_numbers(
        &self,
        numbers: &[DocumentNumber],
    ) -> Result<Vec<Document>, GatewayError>;

    /// Inserts or updates a document, keyed by document id.
    async fn upsert(&self, document: &Document) -> Result<(), GatewayError>;

    /// Marks a document as deleted. Documents are never hard-deleted.
    async fn mark_deleted(&self, id: &DocumentId) -> Result<(), GatewayError>;

    /// Appends one deletion-attempt record to the audit log.
    async fn append_deletion_log(&self, entry: &DeletionLogEntry) -> Result<(), GatewayError>;
}
