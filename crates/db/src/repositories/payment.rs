//! Payment repository.
//!
//! Records payments with generated references and drives their approval
//! lifecycle through the transition repository.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use tradewind_core::payment::{PaymentDirection, PaymentStatus};
use tradewind_core::reference::ReferenceKind;
use tradewind_core::statemachine::TransitionContext;
use tradewind_shared::types::{ActorId, Currency};

use crate::entities::payments;
use crate::entities::sea_orm_active_enums::PaymentStatus as DbPaymentStatus;
use crate::repositories::sequence::{SequenceError, SequenceRepository};
use crate::repositories::transition::{TransitionError, TransitionRepository};

/// Error types for payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Payment not found.
    #[error("Payment not found: {0}")]
    NotFound(Uuid),

    /// Payment amount must be positive.
    #[error("Payment amount must be positive, got {0}")]
    InvalidAmount(i64),

    /// Explicit exchange rate must be positive.
    #[error("Exchange rate must be positive")]
    NonPositiveRate,

    /// Reference generation failed.
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    /// Status transition failed.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct CreatePaymentInput {
    /// Direction of the money flow.
    pub direction: PaymentDirection,
    /// Amount in minor units of the payment currency. Must be positive.
    pub amount: i64,
    /// Payment currency.
    pub currency: Currency,
    /// Explicit exchange rate supplied with the payment, if any.
    pub exchange_rate: Option<Decimal>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Who recorded the payment.
    pub created_by: Option<ActorId>,
}

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
    sequences: SequenceRepository,
    transitions: TransitionRepository,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            sequences: SequenceRepository::new(db.clone()),
            transitions: TransitionRepository::new(db.clone()),
            db,
        }
    }

    /// Records a payment in `pending_approval` with a fresh reference.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive amount or rate.
    pub async fn create_payment(
        &self,
        input: CreatePaymentInput,
    ) -> Result<payments::Model, PaymentError> {
        if input.amount <= 0 {
            return Err(PaymentError::InvalidAmount(input.amount));
        }
        if let Some(rate) = input.exchange_rate
            && rate <= Decimal::ZERO
        {
            return Err(PaymentError::NonPositiveRate);
        }

        let reference = self
            .sequences
            .next_reference(ReferenceKind::Payment, None)
            .await?;

        let now = Utc::now().into();
        let payment = payments::ActiveModel {
            id: Set(Uuid::now_v7()),
            reference: Set(reference),
            direction: Set(input.direction.into()),
            amount: Set(input.amount),
            currency: Set(input.currency.as_str().to_string()),
            exchange_rate: Set(input.exchange_rate),
            status: Set(DbPaymentStatus::PendingApproval),
            notes: Set(input.notes),
            approved_by: Set(None),
            decided_at: Set(None),
            created_by: Set(input.created_by.map(ActorId::into_inner)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        Ok(payment)
    }

    /// Approves a pending payment. Only approved payments count toward
    /// paid totals or may be allocated.
    ///
    /// # Errors
    ///
    /// Returns an invalid-transition error when the payment is not
    /// pending approval.
    pub async fn approve(
        &self,
        payment_id: Uuid,
        actor: ActorId,
        notes: Option<String>,
    ) -> Result<payments::Model, PaymentError> {
        let mut ctx = TransitionContext::actor(actor);
        ctx.notes = notes;
        Ok(self
            .transitions
            .transition_payment(payment_id, PaymentStatus::Approved, ctx)
            .await?)
    }

    /// Rejects a pending payment.
    ///
    /// # Errors
    ///
    /// Returns an invalid-transition error when the payment is not
    /// pending approval.
    pub async fn reject(
        &self,
        payment_id: Uuid,
        actor: ActorId,
        reason: String,
    ) -> Result<payments::Model, PaymentError> {
        Ok(self
            .transitions
            .transition_payment(
                payment_id,
                PaymentStatus::Rejected,
                TransitionContext::actor(actor).with_notes(reason),
            )
            .await?)
    }

    /// Cancels a pending or approved payment.
    ///
    /// # Errors
    ///
    /// Returns an invalid-transition error from terminal statuses.
    pub async fn cancel(
        &self,
        payment_id: Uuid,
        actor: ActorId,
        reason: Option<String>,
    ) -> Result<payments::Model, PaymentError> {
        let mut ctx = TransitionContext::actor(actor);
        ctx.notes = reason;
        Ok(self
            .transitions
            .transition_payment(payment_id, PaymentStatus::Cancelled, ctx)
            .await?)
    }

    /// Fetches one payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment does not exist.
    pub async fn get(&self, payment_id: Uuid) -> Result<payments::Model, PaymentError> {
        payments::Entity::find_by_id(payment_id)
            .one(&self.db)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))
    }

    /// Lists payments, optionally filtered by status, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        status: Option<PaymentStatus>,
    ) -> Result<Vec<payments::Model>, PaymentError> {
        let mut query = payments::Entity::find();
        if let Some(status) = status {
            query = query.filter(payments::Column::Status.eq(DbPaymentStatus::from(status)));
        }
        Ok(query
            .order_by_desc(payments::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }
}
