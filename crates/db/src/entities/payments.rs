//! `SeaORM` Entity for the payments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{PaymentDirection, PaymentStatus};

/// A recorded payment awaiting or past approval.
///
/// Only approved payments count toward paid totals.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Payment identity.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Human-readable reference, unique per payment.
    pub reference: String,
    /// Direction of the money flow.
    pub direction: PaymentDirection,
    /// Amount in minor units of the payment currency.
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Explicit exchange rate supplied with the payment, if any.
    pub exchange_rate: Option<Decimal>,
    /// Approval status.
    pub status: PaymentStatus,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Who approved or rejected the payment.
    pub approved_by: Option<Uuid>,
    /// When the approval decision was made.
    pub decided_at: Option<DateTimeWithTimeZone>,
    /// Who recorded the payment.
    pub created_by: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payment_allocations::Entity")]
    PaymentAllocations,
}

impl Related<super::payment_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentAllocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
