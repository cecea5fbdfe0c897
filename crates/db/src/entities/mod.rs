//! `SeaORM` entity definitions.

pub mod exchange_rates;
pub mod payment_allocations;
pub mod payment_term_stages;
pub mod payment_terms;
pub mod payments;
pub mod reference_sequences;
pub mod schedule_items;
pub mod sea_orm_active_enums;
pub mod state_transitions;
pub mod trade_documents;
