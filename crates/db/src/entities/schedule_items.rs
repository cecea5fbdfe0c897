//! `SeaORM` Entity for the schedule_items table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{CalculationBase, ScheduleItemStatus};

/// A generated payment-schedule item owned by a trade document.
///
/// Items with allocations are never deleted; regeneration only touches
/// unreferenced pending items.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "schedule_items")]
pub struct Model {
    /// Item identity.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning document.
    pub document_id: Uuid,
    /// The term stage this item was generated from.
    pub payment_term_stage_id: Option<Uuid>,
    /// Derived human-readable label.
    pub label: String,
    /// Share of the document total, 0-100.
    pub percentage: i16,
    /// Amount in minor units (signed; negative for credit items).
    pub amount: i64,
    /// ISO 4217 currency code (matches the owning document).
    pub currency: String,
    /// Due condition.
    pub calculation_base: CalculationBase,
    /// Concrete due date, when resolvable.
    pub due_date: Option<Date>,
    /// Lifecycle status.
    pub status: ScheduleItemStatus,
    /// Whether this item gates a downstream transition.
    pub is_blocking: bool,
    /// Ordering within the schedule.
    pub sort_order: i16,
    /// Who waived the item.
    pub waived_by: Option<Uuid>,
    /// When the item was waived.
    pub waived_at: Option<DateTimeWithTimeZone>,
    /// Why the item was waived.
    pub waive_reason: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trade_documents::Entity",
        from = "Column::DocumentId",
        to = "super::trade_documents::Column::Id"
    )]
    TradeDocuments,
    #[sea_orm(
        belongs_to = "super::payment_term_stages::Entity",
        from = "Column::PaymentTermStageId",
        to = "super::payment_term_stages::Column::Id"
    )]
    PaymentTermStages,
    #[sea_orm(has_many = "super::payment_allocations::Entity")]
    PaymentAllocations,
}

impl Related<super::trade_documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TradeDocuments.def()
    }
}

impl Related<super::payment_term_stages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentTermStages.def()
    }
}

impl Related<super::payment_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentAllocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
