//! `SeaORM` Entity for the deletion_log table.
//!
//! Append-only: rows are inserted and never updated or deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "deletion_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub document_id: Option<String>,
    pub deal_id: String,
    pub outcome: String,
    pub error: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub document_snapshot: Option<Json>,
    #[sea_orm(column_type = "JsonBinary")]
    pub expected_numbers: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub removed_numbers: Json,
    pub recorded_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
