//! `SeaORM` Entity for the payment_allocations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Links one payment to one schedule item with the converted amount.
///
/// Immutable once created; corrections are delete + recreate.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_allocations")]
pub struct Model {
    /// Allocation identity.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The allocating payment.
    pub payment_id: Uuid,
    /// The targeted schedule item.
    pub schedule_item_id: Uuid,
    /// The owning document (denormalized for document-level sums).
    pub document_id: Uuid,
    /// Allocated amount in payment currency minor units.
    pub amount: i64,
    /// Exchange rate applied for conversion.
    pub exchange_rate: Decimal,
    /// Allocated amount expressed in document currency minor units.
    pub amount_in_document_currency: i64,
    /// True when no rate was resolvable and amounts were treated 1:1.
    pub rate_fallback: bool,
    /// Who created the allocation.
    pub created_by: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payments::Entity",
        from = "Column::PaymentId",
        to = "super::payments::Column::Id"
    )]
    Payments,
    #[sea_orm(
        belongs_to = "super::schedule_items::Entity",
        from = "Column::ScheduleItemId",
        to = "super::schedule_items::Column::Id"
    )]
    ScheduleItems,
    #[sea_orm(
        belongs_to = "super::trade_documents::Entity",
        from = "Column::DocumentId",
        to = "super::trade_documents::Column::Id"
    )]
    TradeDocuments,
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::schedule_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScheduleItems.def()
    }
}

impl Related<super::trade_documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TradeDocuments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
