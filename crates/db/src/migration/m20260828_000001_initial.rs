//! Initial schema: the document mirror and the deletion audit log.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS deletion_log CASCADE; DROP TABLE IF EXISTS documents CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r"
-- Mirror of documents created in the accounting backend.
-- The primary key is the backend-assigned id, so repeated mirroring of
-- the same document upserts instead of duplicating.
CREATE TABLE documents (
    id TEXT PRIMARY KEY,
    number TEXT,
    deal_id TEXT NOT NULL,
    total_amount NUMERIC(14, 2) NOT NULL,
    currency VARCHAR(3) NOT NULL,
    issue_date DATE NOT NULL,
    buyer JSONB NOT NULL,
    line_items JSONB NOT NULL DEFAULT '[]'::jsonb,
    status VARCHAR(16) NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_documents_status CHECK (status IN ('active', 'deleted'))
);

-- Existing-document resolution looks up active documents by deal
CREATE INDEX idx_documents_deal ON documents(deal_id) WHERE status = 'active';

-- Lookup by backend-assigned number
CREATE INDEX idx_documents_number ON documents(number) WHERE number IS NOT NULL;

-- Append-only audit log of deletion attempts, one row per attempt
CREATE TABLE deletion_log (
    id UUID PRIMARY KEY,
    document_id TEXT,
    deal_id TEXT NOT NULL,
    outcome VARCHAR(32) NOT NULL,
    error TEXT,
    document_snapshot JSONB,
    expected_numbers JSONB NOT NULL DEFAULT '[]'::jsonb,
    removed_numbers JSONB NOT NULL DEFAULT '[]'::jsonb,
    recorded_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Audit queries read a deal's history newest-first
CREATE INDEX idx_deletion_log_deal ON deletion_log(deal_id, recorded_at DESC);
";
