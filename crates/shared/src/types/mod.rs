//! Shared domain primitives.

pub mod id;
pub mod money;

pub use id::{
    ActorId, AllocationId, DocumentId, ExchangeRateId, PaymentId, PaymentTermId,
    PaymentTermStageId, ScheduleItemId, TransitionId,
};
pub use money::{Currency, Money};
