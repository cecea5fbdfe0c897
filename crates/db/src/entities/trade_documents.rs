//! `SeaORM` Entity for the trade_documents table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{DocumentType, PaymentDirection, TradeStatus};

/// A payable trade document: proforma invoice, purchase order, or shipment.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "trade_documents")]
pub struct Model {
    /// Document identity.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Concrete document type.
    pub document_type: DocumentType,
    /// Human-readable reference, unique per document.
    pub reference: String,
    /// Counterparty name.
    pub counterparty: String,
    /// Total amount in minor units. Never negative.
    pub total_amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Payment direction.
    pub direction: PaymentDirection,
    /// Lifecycle status.
    pub status: TradeStatus,
    /// Issue date, if issued.
    pub issue_date: Option<Date>,
    /// Payment term template, if assigned.
    pub payment_term_id: Option<Uuid>,
    /// Cached sum of approved allocations in document currency.
    ///
    /// Display convenience only; allocation sums stay authoritative.
    pub paid_amount: i64,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payment_terms::Entity",
        from = "Column::PaymentTermId",
        to = "super::payment_terms::Column::Id"
    )]
    PaymentTerms,
    #[sea_orm(has_many = "super::schedule_items::Entity")]
    ScheduleItems,
    #[sea_orm(has_many = "super::payment_allocations::Entity")]
    PaymentAllocations,
}

impl Related<super::payment_terms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentTerms.def()
    }
}

impl Related<super::schedule_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScheduleItems.def()
    }
}

impl Related<super::payment_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentAllocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
