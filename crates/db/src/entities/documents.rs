//! `SeaORM` Entity for the documents table.
//!
//! Mirrors documents created in the accounting backend. The primary key
//! is the backend-assigned identifier, so replays of the same creation
//! upsert instead of duplicating.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub number: Option<String>,
    pub deal_id: String,
    pub total_amount: Decimal,
    pub currency: String,
    pub issue_date: Date,
    #[sea_orm(column_type = "JsonBinary")]
    pub buyer: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub line_items: Json,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
