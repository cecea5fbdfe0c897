//! `SeaORM` Entity for the payment_term_stages table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::CalculationBase;

/// One ordered stage of a payment-term template.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_term_stages")]
pub struct Model {
    /// Stage identity.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning term.
    pub payment_term_id: Uuid,
    /// Share of the document total, 0-100.
    pub percentage: i16,
    /// Day offset added to the resolved anchor date.
    pub days: i32,
    /// The event or date the stage is due against.
    pub calculation_base: CalculationBase,
    /// Ordering within the term.
    pub sort_order: i16,
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

impl ActiveModelBehavior for ActiveModel {}
