//! `SeaORM` entity definitions.

pub mod deletion_log;
pub mod documents;
