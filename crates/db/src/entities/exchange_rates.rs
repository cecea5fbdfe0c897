//! `SeaORM` Entity for the exchange_rates table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{RateSource, RateStatus};

/// A dated exchange-rate record. Only approved rows are consulted by
/// conversion.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "exchange_rates")]
pub struct Model {
    /// Record identity.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Source currency code.
    pub from_currency: String,
    /// Target currency code.
    pub to_currency: String,
    /// Exchange rate (1 from_currency = rate to_currency).
    pub rate: Decimal,
    /// Date this rate is effective.
    pub effective_date: Date,
    /// Approval status.
    pub status: RateStatus,
    /// Where the rate came from.
    pub source: RateSource,
    /// Optional reference (e.g., feed provider).
    pub source_reference: Option<String>,
    /// Who entered or approved the rate.
    pub created_by: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
