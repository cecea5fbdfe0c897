//! `SeaORM` Entity for the payment_terms table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A named payment-term template owning ordered stages.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_terms")]
pub struct Model {
    /// Term identity.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Template name (e.g., "30/70 against shipment").
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payment_term_stages::Entity")]
    PaymentTermStages,
    #[sea_orm(has_many = "super::trade_documents::Entity")]
    TradeDocuments,
}

impl Related<super::payment_term_stages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentTermStages.def()
    }
}

impl Related<super::trade_documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TradeDocuments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
