//! `SeaORM` Entity for the reference_sequences table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ReferenceKind;

/// Per (kind, year) monotonic counter. Mutated only under a row lock;
/// (kind, year) is unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "reference_sequences")]
pub struct Model {
    /// Counter identity.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Document kind this counter serves.
    pub kind: ReferenceKind,
    /// Calendar year this counter serves.
    pub year: i32,
    /// Next number to issue.
    pub next_number: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
