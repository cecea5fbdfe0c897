//! Payment allocation repository.
//!
//! Serializes all allocation writes for a document on the document row
//! lock, so the overflow checks run race-free. The cached `paid_amount`
//! on the document is written through on allocate and fully recomputed
//! on deallocate; the allocation sum stays the single source of truth.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use tradewind_core::allocation::{
    check_amount, check_document_overflow, check_item_overflow, check_payment_status,
    convert_allocation, is_paid_in_full, paid_amount, AllocationError as AllocationRule,
    AllocationView,
};
use tradewind_core::schedule::{ScheduleItemStatus, SCHEDULE_ITEM_MACHINE};
use tradewind_core::statemachine::{StateMachineError, TransitionContext};
use tradewind_shared::types::{ActorId, Currency};

use crate::entities::{payment_allocations, payments, schedule_items, trade_documents};
use crate::repositories::exchange_rate::load_rate_table;
use crate::repositories::transition::{append_log, ENTITY_KIND_SCHEDULE_ITEM};

/// Error types for allocation operations.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    /// Payment not found.
    #[error("Payment not found: {0}")]
    PaymentNotFound(Uuid),

    /// Schedule item not found.
    #[error("Schedule item not found: {0}")]
    ItemNotFound(Uuid),

    /// Document not found.
    #[error("Document not found: {0}")]
    DocumentNotFound(Uuid),

    /// Allocation not found.
    #[error("Allocation not found: {0}")]
    AllocationNotFound(Uuid),

    /// Stored currency code is not supported.
    #[error("Unknown currency '{0}'")]
    UnknownCurrency(String),

    /// Allocation rule violation (invalid amount, overflow, status).
    #[error(transparent)]
    Rule(#[from] AllocationRule),

    /// State machine transition error.
    #[error(transparent)]
    StateMachine(#[from] StateMachineError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an allocation.
#[derive(Debug, Clone)]
pub struct AllocateInput {
    /// The allocating payment.
    pub payment_id: Uuid,
    /// The targeted schedule item.
    pub schedule_item_id: Uuid,
    /// Amount in payment currency minor units. Must be positive.
    pub amount: i64,
    /// Explicit exchange rate; overrides lookup when supplied.
    pub explicit_rate: Option<Decimal>,
    /// Who created the allocation.
    pub created_by: Option<ActorId>,
}

/// Outcome of a successful allocation.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    /// The persisted allocation row.
    pub allocation: payment_allocations::Model,
    /// True when no rate was resolvable and amounts were treated 1:1.
    /// Surface this to the user as a warning.
    pub rate_fallback: bool,
    /// The document's cached paid amount after the allocation.
    pub document_paid_amount: i64,
}

/// Payment allocation repository.
#[derive(Debug, Clone)]
pub struct AllocationRepository {
    db: DatabaseConnection,
    base_currency: Currency,
}

impl AllocationRepository {
    /// Creates a new allocation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, base_currency: Currency) -> Self {
        Self { db, base_currency }
    }

    /// Allocates an approved payment against a schedule item.
    ///
    /// Within one transaction: locks the owning document row, converts
    /// the amount into document currency, and rejects any allocation
    /// that would exceed the document's or item's remaining balance -
    /// nothing is persisted on overflow. On success the allocation row
    /// is written, the document's cached `paid_amount` is written
    /// through, and an item whose balance reaches zero is marked paid.
    ///
    /// # Errors
    ///
    /// Returns a rule violation (invalid amount, unapproved payment,
    /// overflow with the excess named) or a not-found error.
    pub async fn allocate(
        &self,
        input: AllocateInput,
    ) -> Result<AllocationOutcome, AllocationError> {
        check_amount(input.amount)?;

        let txn = self.db.begin().await?;

        let payment = payments::Entity::find_by_id(input.payment_id)
            .one(&txn)
            .await?
            .ok_or(AllocationError::PaymentNotFound(input.payment_id))?;
        check_payment_status(payment.status.clone().into())?;

        let item = schedule_items::Entity::find_by_id(input.schedule_item_id)
            .one(&txn)
            .await?
            .ok_or(AllocationError::ItemNotFound(input.schedule_item_id))?;

        // Serialize all allocation writes for this document.
        let document = trade_documents::Entity::find_by_id(item.document_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(AllocationError::DocumentNotFound(item.document_id))?;

        let payment_currency = Currency::parse(&payment.currency)
            .ok_or_else(|| AllocationError::UnknownCurrency(payment.currency.clone()))?;
        let document_currency = Currency::parse(&document.currency)
            .ok_or_else(|| AllocationError::UnknownCurrency(document.currency.clone()))?;

        let table = load_rate_table(&txn, self.base_currency).await?;
        let converted = convert_allocation(
            input.amount,
            payment_currency,
            document_currency,
            input.explicit_rate.or(payment.exchange_rate),
            &table,
            Utc::now().date_naive(),
        )?;

        if converted.rate_fallback {
            warn!(
                payment = %payment.reference,
                document = %document.reference,
                "no exchange rate resolvable, treating amounts 1:1"
            );
        }

        // Balances derive from allocation sums, never from the cache.
        let views = load_allocation_views(&txn, document.id).await?;
        let current_paid = paid_amount(&document_views(&views));
        check_document_overflow(
            converted.amount_in_document_currency,
            document.total_amount,
            current_paid,
            &document.reference,
        )?;

        let item_paid = paid_amount(&item_views(&views, item.id));
        check_item_overflow(
            converted.amount_in_document_currency,
            item.amount,
            item_paid,
            &item.label,
        )?;

        let allocation = payment_allocations::ActiveModel {
            id: Set(Uuid::now_v7()),
            payment_id: Set(payment.id),
            schedule_item_id: Set(item.id),
            document_id: Set(document.id),
            amount: Set(input.amount),
            exchange_rate: Set(converted.rate),
            amount_in_document_currency: Set(converted.amount_in_document_currency),
            rate_fallback: Set(converted.rate_fallback),
            created_by: Set(input.created_by.map(ActorId::into_inner)),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        // Write-through cache.
        let new_paid = current_paid + converted.amount_in_document_currency;
        let document_reference = document.reference.clone();
        let mut active: trade_documents::ActiveModel = document.into();
        active.paid_amount = Set(new_paid);
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        // An item covered in full flips to paid (audited as system).
        let item_status: ScheduleItemStatus = item.status.clone().into();
        if !item_status.is_resolved()
            && item.amount >= 0
            && is_paid_in_full(
                item.amount,
                item_paid + converted.amount_in_document_currency,
            )
        {
            if let Some(plan) = SCHEDULE_ITEM_MACHINE.plan(
                item_status,
                ScheduleItemStatus::Paid,
                TransitionContext::system(),
            )? {
                let item_id = item.id;
                let mut active_item: schedule_items::ActiveModel = item.into();
                active_item.status = Set(ScheduleItemStatus::Paid.into());
                active_item.updated_at = Set(Utc::now().into());
                active_item.update(&txn).await?;
                append_log(&txn, ENTITY_KIND_SCHEDULE_ITEM, item_id, &plan).await?;
            }
        }

        txn.commit().await?;
        info!(
            document = %document_reference,
            amount = converted.amount_in_document_currency,
            "allocated payment"
        );

        Ok(AllocationOutcome {
            allocation,
            rate_fallback: converted.rate_fallback,
            document_paid_amount: new_paid,
        })
    }

    /// Deletes an allocation and reconciles the document cache.
    ///
    /// The cache is rewritten from the authoritative sum of surviving
    /// allocations - never decremented - so repeated deallocation cannot
    /// drift.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation or its document do not exist.
    pub async fn deallocate(&self, allocation_id: Uuid) -> Result<i64, AllocationError> {
        let txn = self.db.begin().await?;

        let allocation = payment_allocations::Entity::find_by_id(allocation_id)
            .one(&txn)
            .await?
            .ok_or(AllocationError::AllocationNotFound(allocation_id))?;

        let document = trade_documents::Entity::find_by_id(allocation.document_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(AllocationError::DocumentNotFound(allocation.document_id))?;

        let document_id = document.id;
        allocation.delete(&txn).await?;

        let paid = recompute_cache(&txn, document).await?;

        txn.commit().await?;
        info!(document_id = %document_id, paid, "deallocated payment");
        Ok(paid)
    }

    /// Rewrites the document's cached paid amount from the allocation
    /// sum. Explicit repair operation for cache drift.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not exist.
    pub async fn reconcile(&self, document_id: Uuid) -> Result<i64, AllocationError> {
        let txn = self.db.begin().await?;

        let document = trade_documents::Entity::find_by_id(document_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(AllocationError::DocumentNotFound(document_id))?;

        let paid = recompute_cache(&txn, document).await?;

        txn.commit().await?;
        Ok(paid)
    }

    /// Lists a payment's allocations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_payment(
        &self,
        payment_id: Uuid,
    ) -> Result<Vec<payment_allocations::Model>, AllocationError> {
        Ok(payment_allocations::Entity::find()
            .filter(payment_allocations::Column::PaymentId.eq(payment_id))
            .all(&self.db)
            .await?)
    }

    /// Lists a document's allocations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_document(
        &self,
        document_id: Uuid,
    ) -> Result<Vec<payment_allocations::Model>, AllocationError> {
        Ok(payment_allocations::Entity::find()
            .filter(payment_allocations::Column::DocumentId.eq(document_id))
            .all(&self.db)
            .await?)
    }
}

/// One allocation row with its payment status, for balance math.
struct LoadedAllocation {
    schedule_item_id: Uuid,
    view: AllocationView,
}

/// Loads all allocations of a document with their payment statuses.
async fn load_allocation_views<C: ConnectionTrait>(
    conn: &C,
    document_id: Uuid,
) -> Result<Vec<LoadedAllocation>, DbErr> {
    let rows = payment_allocations::Entity::find()
        .filter(payment_allocations::Column::DocumentId.eq(document_id))
        .find_also_related(payments::Entity)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(allocation, payment)| {
            payment.map(|p| LoadedAllocation {
                schedule_item_id: allocation.schedule_item_id,
                view: AllocationView {
                    amount_in_document_currency: allocation.amount_in_document_currency,
                    payment_status: p.status.into(),
                },
            })
        })
        .collect())
}

fn document_views(loaded: &[LoadedAllocation]) -> Vec<AllocationView> {
    loaded.iter().map(|l| l.view).collect()
}

fn item_views(loaded: &[LoadedAllocation], item_id: Uuid) -> Vec<AllocationView> {
    loaded
        .iter()
        .filter(|l| l.schedule_item_id == item_id)
        .map(|l| l.view)
        .collect()
}

/// Rewrites the cached paid amount from the authoritative sum.
async fn recompute_cache<C: ConnectionTrait>(
    conn: &C,
    document: trade_documents::Model,
) -> Result<i64, DbErr> {
    let views = load_allocation_views(conn, document.id).await?;
    let paid = paid_amount(&document_views(&views));

    let mut active: trade_documents::ActiveModel = document.into();
    active.paid_amount = Set(paid);
    active.updated_at = Set(Utc::now().into());
    active.update(conn).await?;

    Ok(paid)
}
