//! Document repository implementing the core ledger-store contract.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use billflow_core::deletion::DeletionLogEntry;
use billflow_core::document::{Buyer, Document, DocumentStatus, LineItem};
use billflow_core::gateway::{GatewayError, LedgerStore};
use billflow_shared::types::{Currency, DealId, DocumentId, DocumentNumber, Money};

use crate::entities::{deletion_log, documents};

/// Document repository backing the local ledger.
#[derive(Debug)]
pub struct DocumentRepository {
    db: DatabaseConnection,
}

impl DocumentRepository {
    /// Creates a new document repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LedgerStore for DocumentRepository {
    async fn find_by_deal_id(&self, deal_id: &DealId) -> Result<Vec<Document>, GatewayError> {
        let models = documents::Entity::find()
            .filter(documents::Column::DealId.eq(deal_id.as_str()))
            .order_by_asc(documents::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| map_db_err("find_by_deal_id", &e))?;
        models.into_iter().map(to_domain).collect()
    }

    async fn find_by_ids(&self, ids: &[DocumentId]) -> Result<Vec<Document>, GatewayError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<&str> = ids.iter().map(DocumentId::as_str).collect();
        let models = documents::Entity::find()
            .filter(documents::Column::Id.is_in(raw))
            .all(&self.db)
            .await
            .map_err(|e| map_db_err("find_by_ids", &e))?;
        models.into_iter().map(to_domain).collect()
    }

    async fn find_by_numbers(
        &self,
        numbers: &[DocumentNumber],
    ) -> Result<Vec<Document>, GatewayError> {
        if numbers.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<&str> = numbers.iter().map(DocumentNumber::as_str).collect();
        let models = documents::Entity::find()
            .filter(documents::Column::Number.is_in(raw))
            .all(&self.db)
            .await
            .map_err(|e| map_db_err("find_by_numbers", &e))?;
        models.into_iter().map(to_domain).collect()
    }

    async fn upsert(&self, document: &Document) -> Result<(), GatewayError> {
        let model = to_active(document)?;
        documents::Entity::insert(model)
            .on_conflict(
                OnConflict::column(documents::Column::Id)
                    .update_columns([
                        documents::Column::Number,
                        documents::Column::DealId,
                        documents::Column::TotalAmount,
                        documents::Column::Currency,
                        documents::Column::IssueDate,
                        documents::Column::Buyer,
                        documents::Column::LineItems,
                        documents::Column::Status,
                        documents::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| map_db_err("upsert", &e))?;
        debug!(document_id = %document.id, "document mirrored");
        Ok(())
    }

    async fn mark_deleted(&self, id: &DocumentId) -> Result<(), GatewayError> {
        let result = documents::Entity::update_many()
            .col_expr(
                documents::Column::Status,
                Expr::value(DocumentStatus::Deleted.as_str()),
            )
            .col_expr(
                documents::Column::UpdatedAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(documents::Column::Id.eq(id.as_str()))
            .exec(&self.db)
            .await
            .map_err(|e| map_db_err("mark_deleted", &e))?;
        if result.rows_affected == 0 {
            return Err(GatewayError::NotFound(format!("document {id}")));
        }
        Ok(())
    }

    async fn append_deletion_log(&self, entry: &DeletionLogEntry) -> Result<(), GatewayError> {
        let model = log_to_active(entry)?;
        deletion_log::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| map_db_err("append_deletion_log", &e))?;
        Ok(())
    }
}

/// Maps a database error onto the collaborator error taxonomy.
///
/// Connection-level failures are retryable; anything else means the
/// adapter and the schema disagree and retrying will not help.
fn map_db_err(context: &str, error: &DbErr) -> GatewayError {
    match error {
        DbErr::RecordNotFound(msg) => GatewayError::NotFound(msg.clone()),
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
            GatewayError::Transient(format!("{context}: {error}"))
        }
        other => GatewayError::Protocol(format!("{context}: {other}")),
    }
}

fn to_domain(model: documents::Model) -> Result<Document, GatewayError> {
    let currency = model
        .currency
        .parse::<Currency>()
        .map_err(GatewayError::Protocol)?;
    let status = DocumentStatus::parse(&model.status).ok_or_else(|| {
        GatewayError::Protocol(format!("unknown document status: {}", model.status))
    })?;
    let buyer: Buyer = serde_json::from_value(model.buyer)
        .map_err(|e| GatewayError::Protocol(format!("buyer column: {e}")))?;
    let line_items: Vec<LineItem> = serde_json::from_value(model.line_items)
        .map_err(|e| GatewayError::Protocol(format!("line_items column: {e}")))?;

    Ok(Document {
        id: DocumentId::new(model.id),
        number: model.number.map(DocumentNumber::new),
        deal_id: DealId::new(model.deal_id),
        total: Money::new(model.total_amount, currency),
        issue_date: model.issue_date,
        buyer,
        line_items,
        status,
    })
}

fn to_active(document: &Document) -> Result<documents::ActiveModel, GatewayError> {
    let buyer = serde_json::to_value(&document.buyer)
        .map_err(|e| GatewayError::Protocol(format!("buyer column: {e}")))?;
    let line_items = serde_json::to_value(&document.line_items)
        .map_err(|e| GatewayError::Protocol(format!("line_items column: {e}")))?;
    let now = chrono::Utc::now().into();

    Ok(documents::ActiveModel {
        id: Set(document.id.as_str().to_string()),
        number: Set(document.number.as_ref().map(|n| n.as_str().to_string())),
        deal_id: Set(document.deal_id.as_str().to_string()),
        total_amount: Set(document.total.amount),
        currency: Set(document.total.currency.to_string()),
        issue_date: Set(document.issue_date),
        buyer: Set(buyer),
        line_items: Set(line_items),
        status: Set(document.status.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    })
}

fn log_to_active(entry: &DeletionLogEntry) -> Result<deletion_log::ActiveModel, GatewayError> {
    let snapshot = entry
        .document_snapshot
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| GatewayError::Protocol(format!("document_snapshot column: {e}")))?;
    let expected = serde_json::to_value(&entry.expected_numbers)
        .map_err(|e| GatewayError::Protocol(format!("expected_numbers column: {e}")))?;
    let removed = serde_json::to_value(&entry.removed_numbers)
        .map_err(|e| GatewayError::Protocol(format!("removed_numbers column: {e}")))?;

    Ok(deletion_log::ActiveModel {
        id: Set(entry.id),
        document_id: Set(entry.document_id.as_ref().map(|d| d.as_str().to_string())),
        deal_id: Set(entry.deal_id.as_str().to_string()),
        outcome: Set(entry.outcome.as_str().to_string()),
        error: Set(entry.error.clone()),
        document_snapshot: Set(snapshot),
        expected_numbers: Set(expected),
        removed_numbers: Set(removed),
        recorded_at: Set(entry.recorded_at.into()),
    })
}
