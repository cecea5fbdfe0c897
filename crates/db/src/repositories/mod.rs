//! Repository abstractions for data access.
//!
//! Each repository wraps one aggregate's operations in transactions with
//! row-level locking, delegating validation and arithmetic to
//! `tradewind-core`.

pub mod allocation;
pub mod document;
pub mod exchange_rate;
pub mod payment;
pub mod schedule;
pub mod sequence;
pub mod transition;

pub use allocation::AllocationRepository;
pub use document::DocumentRepository;
pub use exchange_rate::ExchangeRateRepository;
pub use payment::PaymentRepository;
pub use schedule::ScheduleRepository;
pub use sequence::SequenceRepository;
pub use transition::TransitionRepository;
