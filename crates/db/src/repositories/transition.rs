//! Status transition repository.
//!
//! Commits validated transitions: locks the entity row, re-validates
//! under the lock, persists the new status, appends the audit row, and
//! runs an optional side-effect callback inside the same transaction so
//! a callback failure rolls back everything.
//!
//! Document transitions run the blocking-condition evaluator as a
//! mandatory pre-transition hook; callers cannot skip it.

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use tradewind_core::blocking::{blocking_items_for, BlockingItemView};
use tradewind_core::document::{DocumentType, TradeStatus};
use tradewind_core::payment::{PaymentStatus, PAYMENT_MACHINE};
use tradewind_core::statemachine::{
    State, StateMachineError, TransitionContext, TransitionPlan,
};
use tradewind_shared::types::{ActorId, ScheduleItemId};

use crate::entities::{schedule_items, state_transitions, trade_documents, payments};

/// Entity kind tag for trade documents in the audit log.
pub const ENTITY_KIND_DOCUMENT: &str = "trade_document";
/// Entity kind tag for payments in the audit log.
pub const ENTITY_KIND_PAYMENT: &str = "payment";
/// Entity kind tag for schedule items in the audit log.
pub const ENTITY_KIND_SCHEDULE_ITEM: &str = "schedule_item";

/// Error types for transition operations.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    /// Document not found.
    #[error("Document not found: {0}")]
    DocumentNotFound(Uuid),

    /// Payment not found.
    #[error("Payment not found: {0}")]
    PaymentNotFound(Uuid),

    /// Transition gated by unresolved blocking schedule items.
    #[error("Transition to {target} is blocked by {} unresolved schedule item(s)", items.len())]
    Blocked {
        /// The refused target status.
        target: String,
        /// The items gating the transition, for the caller to surface.
        items: Vec<BlockingItemView>,
    },

    /// Invalid transition per the entity's status graph.
    #[error(transparent)]
    StateMachine(#[from] StateMachineError),

    /// Side-effect callback failed; the transition was rolled back.
    #[error("Transition side effect failed: {0}")]
    SideEffect(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Side-effect callback invoked with the updated document, still inside
/// the transition's transaction.
pub type DocumentSideEffect = Box<
    dyn for<'c> FnOnce(
            &'c DatabaseTransaction,
            &'c trade_documents::Model,
        ) -> BoxFuture<'c, Result<(), TransitionError>>
        + Send,
>;

/// Filter options for querying the audit log.
#[derive(Debug, Clone, Default)]
pub struct TransitionLogFilter {
    /// Restrict to one entity kind.
    pub entity_kind: Option<String>,
    /// Restrict to one entity.
    pub entity_id: Option<Uuid>,
    /// Restrict to one acting principal.
    pub actor_id: Option<Uuid>,
    /// Lower bound on `occurred_at`.
    pub occurred_after: Option<DateTime<Utc>>,
    /// Upper bound on `occurred_at`.
    pub occurred_before: Option<DateTime<Utc>>,
}

/// Status transition repository.
#[derive(Debug, Clone)]
pub struct TransitionRepository {
    db: DatabaseConnection,
}

impl TransitionRepository {
    /// Creates a new transition repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Transitions a trade document to a new status.
    ///
    /// Within one transaction: locks the document row, re-validates the
    /// transition against the per-type status graph, refuses when
    /// unresolved blocking schedule items gate the target, persists the
    /// status, appends the audit row, then runs the optional side
    /// effect. A transition to the current status is an idempotent no-op
    /// (no audit row, no error).
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Blocked`] with the gating items, or an
    /// invalid-transition error naming the allowed set.
    pub async fn transition_document(
        &self,
        document_id: Uuid,
        to: TradeStatus,
        ctx: TransitionContext,
        side_effect: Option<DocumentSideEffect>,
    ) -> Result<trade_documents::Model, TransitionError> {
        let txn = self.db.begin().await?;

        let document = trade_documents::Entity::find_by_id(document_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(TransitionError::DocumentNotFound(document_id))?;

        let current: TradeStatus = document.status.clone().into();
        let machine = DocumentType::from(document.document_type.clone()).state_machine();

        let Some(plan) = machine.plan(current, to, ctx)? else {
            // Idempotent no-op: nothing to persist, nothing to log.
            txn.commit().await?;
            return Ok(document);
        };

        // Mandatory blocking hook: unresolved blocking items gate their
        // mapped target status.
        let views = load_blocking_views(&txn, document_id).await?;
        let blockers = blocking_items_for(&views, to);
        if !blockers.is_empty() {
            return Err(TransitionError::Blocked {
                target: to.as_str().to_string(),
                items: blockers.into_iter().cloned().collect(),
            });
        }

        let mut active: trade_documents::ActiveModel = document.into();
        active.status = Set(to.into());
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        append_log(&txn, ENTITY_KIND_DOCUMENT, document_id, &plan).await?;

        if let Some(effect) = side_effect {
            effect(&txn, &updated).await?;
        }

        txn.commit().await?;
        Ok(updated)
    }

    /// Transitions a payment to a new status.
    ///
    /// Approval decisions (approved/rejected) record the decider and the
    /// decision time from the transition context.
    ///
    /// # Errors
    ///
    /// Returns an invalid-transition error naming the allowed set.
    pub async fn transition_payment(
        &self,
        payment_id: Uuid,
        to: PaymentStatus,
        ctx: TransitionContext,
    ) -> Result<payments::Model, TransitionError> {
        let txn = self.db.begin().await?;

        let payment = payments::Entity::find_by_id(payment_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(TransitionError::PaymentNotFound(payment_id))?;

        let current: PaymentStatus = payment.status.clone().into();
        let actor = ctx.actor;

        let Some(plan) = PAYMENT_MACHINE.plan(current, to, ctx)? else {
            txn.commit().await?;
            return Ok(payment);
        };

        let now = Utc::now().into();
        let mut active: payments::ActiveModel = payment.into();
        active.status = Set(to.into());
        if matches!(to, PaymentStatus::Approved | PaymentStatus::Rejected) {
            active.approved_by = Set(actor.map(ActorId::into_inner));
            active.decided_at = Set(Some(now));
        }
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;

        append_log(&txn, ENTITY_KIND_PAYMENT, payment_id, &plan).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Queries the audit log, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_log(
        &self,
        filter: TransitionLogFilter,
    ) -> Result<Vec<state_transitions::Model>, TransitionError> {
        let mut query = state_transitions::Entity::find();

        if let Some(kind) = filter.entity_kind {
            query = query.filter(state_transitions::Column::EntityKind.eq(kind));
        }
        if let Some(id) = filter.entity_id {
            query = query.filter(state_transitions::Column::EntityId.eq(id));
        }
        if let Some(actor) = filter.actor_id {
            query = query.filter(state_transitions::Column::ActorId.eq(actor));
        }
        if let Some(after) = filter.occurred_after {
            query = query.filter(state_transitions::Column::OccurredAt.gte(after));
        }
        if let Some(before) = filter.occurred_before {
            query = query.filter(state_transitions::Column::OccurredAt.lte(before));
        }

        Ok(query
            .order_by_asc(state_transitions::Column::OccurredAt)
            .all(&self.db)
            .await?)
    }

    /// Audit trail of one entity, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn history(
        &self,
        entity_kind: &str,
        entity_id: Uuid,
    ) -> Result<Vec<state_transitions::Model>, TransitionError> {
        self.list_log(TransitionLogFilter {
            entity_kind: Some(entity_kind.to_string()),
            entity_id: Some(entity_id),
            ..TransitionLogFilter::default()
        })
        .await
    }
}

/// Appends one audit row for a committed transition plan.
pub(crate) async fn append_log<C: ConnectionTrait, S: State>(
    conn: &C,
    entity_kind: &str,
    entity_id: Uuid,
    plan: &TransitionPlan<S>,
) -> Result<state_transitions::Model, DbErr> {
    state_transitions::ActiveModel {
        id: Set(Uuid::now_v7()),
        entity_kind: Set(entity_kind.to_string()),
        entity_id: Set(entity_id),
        from_status: Set(plan.from.as_str().to_string()),
        to_status: Set(plan.to.as_str().to_string()),
        notes: Set(plan.notes.clone()),
        metadata: Set(plan.metadata.clone()),
        actor_id: Set(plan.actor.map(ActorId::into_inner)),
        occurred_at: Set(plan.occurred_at.into()),
    }
    .insert(conn)
    .await
}

/// Loads the blocking-evaluation views of a document's schedule items.
pub(crate) async fn load_blocking_views<C: ConnectionTrait>(
    conn: &C,
    document_id: Uuid,
) -> Result<Vec<BlockingItemView>, DbErr> {
    let items = schedule_items::Entity::find()
        .filter(schedule_items::Column::DocumentId.eq(document_id))
        .all(conn)
        .await?;

    Ok(items
        .into_iter()
        .map(|item| BlockingItemView {
            id: ScheduleItemId::from_uuid(item.id),
            label: item.label,
            base: item.calculation_base.into(),
            status: item.status.into(),
            is_blocking: item.is_blocking,
        })
        .collect())
}
