//! Payment schedule repository.
//!
//! Wraps the core schedule generator in transactions: generation,
//! incremental regeneration after a payment-term change, waiving, and
//! the due/overdue status sweep.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use tradewind_core::allocation::{is_paid_in_full, paid_amount, remaining_amount, AllocationView};
use tradewind_core::document::{DocumentType, PayableSnapshot};
use tradewind_core::schedule::{
    plan_regeneration, plan_schedule, ExistingScheduleItem, PlannedScheduleItem,
    ScheduleItemStatus, TermStage, SCHEDULE_ITEM_MACHINE,
};
use tradewind_core::statemachine::{StateMachineError, TransitionContext};
use tradewind_shared::types::{ActorId, Currency, PaymentTermStageId, ScheduleItemId};

use crate::entities::{
    payment_allocations, payment_term_stages, payments, schedule_items, trade_documents,
};
use crate::repositories::transition::{append_log, ENTITY_KIND_SCHEDULE_ITEM};

/// Error types for schedule operations.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Document not found.
    #[error("Document not found: {0}")]
    DocumentNotFound(Uuid),

    /// Schedule item not found.
    #[error("Schedule item not found: {0}")]
    ItemNotFound(Uuid),

    /// Stored currency code is not supported.
    #[error("Unknown currency '{0}'")]
    UnknownCurrency(String),

    /// Waive reason is required but not provided.
    #[error("Waive reason is required")]
    WaiveReasonRequired,

    /// Invalid item status transition (e.g., waiving a paid item).
    #[error(transparent)]
    StateMachine(#[from] StateMachineError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Derived balance of one schedule item.
#[derive(Debug, Clone, Copy)]
pub struct ItemBalance {
    /// The item's amount in minor units.
    pub amount: i64,
    /// Sum of approved-payment allocations in document currency.
    pub paid_amount: i64,
    /// Remaining amount, floored at zero.
    pub remaining_amount: i64,
    /// Whether the item is fully covered.
    pub is_paid_in_full: bool,
}

/// Payment schedule repository.
#[derive(Debug, Clone)]
pub struct ScheduleRepository {
    db: DatabaseConnection,
}

impl ScheduleRepository {
    /// Creates a new schedule repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Generates the payment schedule for a document.
    ///
    /// No-op returning 0 when the document has no payment term, the term
    /// has no stages, or schedule items already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not exist.
    pub async fn generate(&self, document_id: Uuid) -> Result<u64, ScheduleError> {
        let txn = self.db.begin().await?;

        let document = trade_documents::Entity::find_by_id(document_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(ScheduleError::DocumentNotFound(document_id))?;

        let Some(term_id) = document.payment_term_id else {
            txn.commit().await?;
            return Ok(0);
        };

        let existing = schedule_items::Entity::find()
            .filter(schedule_items::Column::DocumentId.eq(document_id))
            .count(&txn)
            .await?;
        if existing > 0 {
            txn.commit().await?;
            return Ok(0);
        }

        let stages = load_stages(&txn, term_id).await?;
        if stages.is_empty() {
            txn.commit().await?;
            return Ok(0);
        }

        let payable = snapshot(&document)?;
        let planned = plan_schedule(&payable, &stages);
        let created = planned.len() as u64;

        for item in planned {
            insert_item(&txn, document_id, &item).await?;
        }

        txn.commit().await?;
        info!(document = %document.reference, created, "generated payment schedule");
        Ok(created)
    }

    /// Incrementally regenerates the schedule after a term change.
    ///
    /// Deletes only items that are neither paid nor waived and have zero
    /// allocations, then generates for stages without a surviving item.
    /// Items with allocations are never deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not exist.
    pub async fn regenerate(&self, document_id: Uuid) -> Result<u64, ScheduleError> {
        let txn = self.db.begin().await?;

        let document = trade_documents::Entity::find_by_id(document_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(ScheduleError::DocumentNotFound(document_id))?;

        let Some(term_id) = document.payment_term_id else {
            txn.commit().await?;
            return Ok(0);
        };

        let stages = load_stages(&txn, term_id).await?;
        let existing = load_existing_views(&txn, document_id).await?;

        let payable = snapshot(&document)?;
        let plan = plan_regeneration(&payable, &stages, &existing);

        if !plan.delete.is_empty() {
            let delete_ids: Vec<Uuid> =
                plan.delete.iter().map(|id| id.into_inner()).collect();
            schedule_items::Entity::delete_many()
                .filter(schedule_items::Column::Id.is_in(delete_ids))
                .exec(&txn)
                .await?;
        }

        let created = plan.create.len() as u64;
        for item in &plan.create {
            insert_item(&txn, document_id, item).await?;
        }

        txn.commit().await?;
        info!(
            document = %document.reference,
            deleted = plan.delete.len(),
            created,
            "regenerated payment schedule"
        );
        Ok(created)
    }

    /// Waives a schedule item, recording who, when, and why.
    ///
    /// # Errors
    ///
    /// Returns an invalid-transition error when the item is already
    /// paid or waived, and [`ScheduleError::WaiveReasonRequired`] for an
    /// empty reason.
    pub async fn waive(
        &self,
        item_id: Uuid,
        actor: ActorId,
        reason: String,
    ) -> Result<schedule_items::Model, ScheduleError> {
        if reason.trim().is_empty() {
            return Err(ScheduleError::WaiveReasonRequired);
        }

        let txn = self.db.begin().await?;

        let item = schedule_items::Entity::find_by_id(item_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(ScheduleError::ItemNotFound(item_id))?;

        let current: ScheduleItemStatus = item.status.clone().into();
        let ctx = TransitionContext::actor(actor).with_notes(reason.clone());

        let Some(plan) = SCHEDULE_ITEM_MACHINE.plan(current, ScheduleItemStatus::Waived, ctx)?
        else {
            txn.commit().await?;
            return Ok(item);
        };

        let now = Utc::now().into();
        let mut active: schedule_items::ActiveModel = item.into();
        active.status = Set(ScheduleItemStatus::Waived.into());
        active.waived_by = Set(Some(actor.into_inner()));
        active.waived_at = Set(Some(now));
        active.waive_reason = Set(Some(reason));
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;

        append_log(&txn, ENTITY_KIND_SCHEDULE_ITEM, item_id, &plan).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Sweeps a document's items into due/overdue per their due dates.
    ///
    /// Pending items whose date has arrived become due; pending or due
    /// items whose date has passed become overdue. Audited as system
    /// transitions. Returns the number of items updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not exist.
    pub async fn refresh_due_statuses(
        &self,
        document_id: Uuid,
        today: NaiveDate,
    ) -> Result<u64, ScheduleError> {
        let txn = self.db.begin().await?;

        trade_documents::Entity::find_by_id(document_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(ScheduleError::DocumentNotFound(document_id))?;

        let items = schedule_items::Entity::find()
            .filter(schedule_items::Column::DocumentId.eq(document_id))
            .all(&txn)
            .await?;

        let mut updated = 0u64;
        for item in items {
            let current: ScheduleItemStatus = item.status.clone().into();
            let Some(target) = due_sweep_target(current, item.due_date, today) else {
                continue;
            };

            let Some(plan) =
                SCHEDULE_ITEM_MACHINE.plan(current, target, TransitionContext::system())?
            else {
                continue;
            };

            let item_id = item.id;
            let mut active: schedule_items::ActiveModel = item.into();
            active.status = Set(target.into());
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?;

            append_log(&txn, ENTITY_KIND_SCHEDULE_ITEM, item_id, &plan).await?;
            updated += 1;
        }

        txn.commit().await?;
        Ok(updated)
    }

    /// Lists a document's schedule items in schedule order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_items(
        &self,
        document_id: Uuid,
    ) -> Result<Vec<schedule_items::Model>, ScheduleError> {
        Ok(schedule_items::Entity::find()
            .filter(schedule_items::Column::DocumentId.eq(document_id))
            .order_by_asc(schedule_items::Column::SortOrder)
            .all(&self.db)
            .await?)
    }

    /// Derived balance of one schedule item.
    ///
    /// Computed from approved-payment allocations; never read from a
    /// stored field.
    ///
    /// # Errors
    ///
    /// Returns an error if the item does not exist.
    pub async fn item_balance(&self, item_id: Uuid) -> Result<ItemBalance, ScheduleError> {
        let item = schedule_items::Entity::find_by_id(item_id)
            .one(&self.db)
            .await?
            .ok_or(ScheduleError::ItemNotFound(item_id))?;

        let allocations = payment_allocations::Entity::find()
            .filter(payment_allocations::Column::ScheduleItemId.eq(item_id))
            .find_also_related(payments::Entity)
            .all(&self.db)
            .await?;

        let views: Vec<AllocationView> = allocations
            .iter()
            .filter_map(|(allocation, payment)| {
                payment.as_ref().map(|p| AllocationView {
                    amount_in_document_currency: allocation.amount_in_document_currency,
                    payment_status: p.status.clone().into(),
                })
            })
            .collect();

        let paid = paid_amount(&views);
        Ok(ItemBalance {
            amount: item.amount,
            paid_amount: paid,
            remaining_amount: remaining_amount(item.amount, paid),
            is_paid_in_full: is_paid_in_full(item.amount, paid),
        })
    }
}

/// Target of the due/overdue sweep for one item, if any.
fn due_sweep_target(
    current: ScheduleItemStatus,
    due_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<ScheduleItemStatus> {
    let due_date = due_date?;
    match current {
        ScheduleItemStatus::Pending if due_date < today => Some(ScheduleItemStatus::Overdue),
        ScheduleItemStatus::Pending if due_date <= today => Some(ScheduleItemStatus::Due),
        ScheduleItemStatus::Due if due_date < today => Some(ScheduleItemStatus::Overdue),
        _ => None,
    }
}

/// Builds the core payable view of a document row.
pub(crate) fn snapshot(
    document: &trade_documents::Model,
) -> Result<PayableSnapshot, ScheduleError> {
    let currency = Currency::parse(&document.currency)
        .ok_or_else(|| ScheduleError::UnknownCurrency(document.currency.clone()))?;

    Ok(PayableSnapshot {
        id: tradewind_shared::types::DocumentId::from_uuid(document.id),
        document_type: DocumentType::from(document.document_type.clone()),
        reference: document.reference.clone(),
        total_minor: document.total_amount,
        currency,
        direction: document.direction.clone().into(),
        issue_date: document.issue_date,
        created_on: document.created_at.date_naive(),
    })
}

/// Loads a term's stages as core stage views, in sort order.
async fn load_stages<C: ConnectionTrait>(
    conn: &C,
    term_id: Uuid,
) -> Result<Vec<TermStage>, ScheduleError> {
    let rows = payment_term_stages::Entity::find()
        .filter(payment_term_stages::Column::PaymentTermId.eq(term_id))
        .order_by_asc(payment_term_stages::Column::SortOrder)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| TermStage {
            id: PaymentTermStageId::from_uuid(row.id),
            percentage: u8::try_from(row.percentage.clamp(0, 100)).unwrap_or(0),
            days: u32::try_from(row.days.max(0)).unwrap_or(0),
            base: row.calculation_base.into(),
            sort_order: row.sort_order,
        })
        .collect())
}

/// Loads regeneration views of a document's items with allocation counts.
async fn load_existing_views<C: ConnectionTrait>(
    conn: &C,
    document_id: Uuid,
) -> Result<Vec<ExistingScheduleItem>, ScheduleError> {
    let items = schedule_items::Entity::find()
        .filter(schedule_items::Column::DocumentId.eq(document_id))
        .all(conn)
        .await?;

    let allocations = payment_allocations::Entity::find()
        .filter(payment_allocations::Column::DocumentId.eq(document_id))
        .all(conn)
        .await?;

    let mut counts: HashMap<Uuid, u64> = HashMap::new();
    for allocation in allocations {
        *counts.entry(allocation.schedule_item_id).or_insert(0) += 1;
    }

    Ok(items
        .into_iter()
        .map(|item| ExistingScheduleItem {
            id: ScheduleItemId::from_uuid(item.id),
            stage_id: item.payment_term_stage_id.map(PaymentTermStageId::from_uuid),
            status: item.status.into(),
            allocation_count: counts.get(&item.id).copied().unwrap_or(0),
        })
        .collect())
}

/// Persists one planned schedule item with status pending.
async fn insert_item<C: ConnectionTrait>(
    conn: &C,
    document_id: Uuid,
    item: &PlannedScheduleItem,
) -> Result<(), DbErr> {
    let now = Utc::now().into();
    schedule_items::ActiveModel {
        id: Set(Uuid::now_v7()),
        document_id: Set(document_id),
        payment_term_stage_id: Set(Some(item.stage_id.into_inner())),
        label: Set(item.label.clone()),
        percentage: Set(i16::from(item.percentage)),
        amount: Set(item.amount_minor),
        currency: Set(item.currency.as_str().to_string()),
        calculation_base: Set(item.base.into()),
        due_date: Set(item.due_date),
        status: Set(ScheduleItemStatus::Pending.into()),
        is_blocking: Set(item.is_blocking),
        sort_order: Set(item.sort_order),
        waived_by: Set(None),
        waived_at: Set(None),
        waive_reason: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_due_sweep_pending_becomes_due_on_the_day() {
        assert_eq!(
            due_sweep_target(
                ScheduleItemStatus::Pending,
                Some(date(2026, 5, 10)),
                date(2026, 5, 10)
            ),
            Some(ScheduleItemStatus::Due)
        );
    }

    #[test]
    fn test_due_sweep_pending_becomes_overdue_past_the_day() {
        assert_eq!(
            due_sweep_target(
                ScheduleItemStatus::Pending,
                Some(date(2026, 5, 10)),
                date(2026, 5, 11)
            ),
            Some(ScheduleItemStatus::Overdue)
        );
    }

    #[test]
    fn test_due_sweep_due_becomes_overdue() {
        assert_eq!(
            due_sweep_target(
                ScheduleItemStatus::Due,
                Some(date(2026, 5, 10)),
                date(2026, 5, 11)
            ),
            Some(ScheduleItemStatus::Overdue)
        );
    }

    #[test]
    fn test_due_sweep_skips_future_and_resolved_items() {
        assert_eq!(
            due_sweep_target(
                ScheduleItemStatus::Pending,
                Some(date(2026, 5, 10)),
                date(2026, 5, 9)
            ),
            None
        );
        assert_eq!(
            due_sweep_target(
                ScheduleItemStatus::Paid,
                Some(date(2026, 5, 10)),
                date(2026, 6, 1)
            ),
            None
        );
        assert_eq!(
            due_sweep_target(ScheduleItemStatus::Pending, None, date(2026, 5, 9)),
            None
        );
    }
}
