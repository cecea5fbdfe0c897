//! `SeaORM` Entity for the state_transitions audit log.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One immutable status-change record. Append-only; never updated or
/// deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "state_transitions")]
pub struct Model {
    /// Record identity.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Kind of the transitioned entity (e.g., "trade_document").
    pub entity_kind: String,
    /// Identity of the transitioned entity.
    pub entity_id: Uuid,
    /// Status before the transition.
    pub from_status: String,
    /// Status after the transition.
    pub to_status: String,
    /// Optional human-readable notes.
    pub notes: Option<String>,
    /// Optional structured metadata.
    pub metadata: Option<Json>,
    /// Acting principal, or null for system transitions.
    pub actor_id: Option<Uuid>,
    /// When the transition occurred.
    pub occurred_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
