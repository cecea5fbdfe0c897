//! Schedule domain types: calculation bases, item statuses, term stages.

use serde::{Deserialize, Serialize};
use std::fmt;

use tradewind_shared::types::{Currency, PaymentTermStageId, ScheduleItemId};

use crate::statemachine::{State, StateMachine};

/// The event or date a payment stage is due against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationBase {
    /// Due relative to the order date.
    OrderDate,
    /// Due relative to the purchase-order date.
    PoDate,
    /// Due relative to the invoice date.
    InvoiceDate,
    /// Due before production may start.
    BeforeProduction,
    /// Due before goods may ship.
    BeforeShipment,
    /// Due after shipment (e.g., balance on delivery).
    AfterShipment,
}

impl CalculationBase {
    /// Returns the storage representation of the base.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OrderDate => "order_date",
            Self::PoDate => "po_date",
            Self::InvoiceDate => "invoice_date",
            Self::BeforeProduction => "before_production",
            Self::BeforeShipment => "before_shipment",
            Self::AfterShipment => "after_shipment",
        }
    }

    /// Parses a base from its storage string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "order_date" => Some(Self::OrderDate),
            "po_date" => Some(Self::PoDate),
            "invoice_date" => Some(Self::InvoiceDate),
            "before_production" => Some(Self::BeforeProduction),
            "before_shipment" => Some(Self::BeforeShipment),
            "after_shipment" => Some(Self::AfterShipment),
            _ => None,
        }
    }

    /// Human-readable condition label used in schedule item labels.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::OrderDate => "order date",
            Self::PoDate => "PO date",
            Self::InvoiceDate => "invoice date",
            Self::BeforeProduction => "before production",
            Self::BeforeShipment => "before shipment",
            Self::AfterShipment => "after shipment",
        }
    }

    /// Whether items on this base gate a downstream status transition.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        matches!(
            self,
            Self::BeforeProduction | Self::BeforeShipment | Self::OrderDate | Self::PoDate
        )
    }

    /// Whether a concrete due date can be computed at generation time.
    ///
    /// Production/shipment-relative bases are resolved later by
    /// downstream events.
    #[must_use]
    pub const fn resolves_at_generation(&self) -> bool {
        matches!(self, Self::OrderDate | Self::PoDate | Self::InvoiceDate)
    }
}

impl fmt::Display for CalculationBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a schedule item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleItemStatus {
    /// Generated, not yet due.
    Pending,
    /// The due date has arrived.
    Due,
    /// Fully covered by allocations.
    Paid,
    /// The due date has passed without full payment.
    Overdue,
    /// Explicitly forgiven; no longer owed.
    Waived,
}

impl ScheduleItemStatus {
    /// Parses a status from its storage string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "due" => Some(Self::Due),
            "paid" => Some(Self::Paid),
            "overdue" => Some(Self::Overdue),
            "waived" => Some(Self::Waived),
            _ => None,
        }
    }

    /// Whether the item no longer demands payment.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Paid | Self::Waived)
    }
}

impl State for ScheduleItemStatus {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Due => "due",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Waived => "waived",
        }
    }
}

impl fmt::Display for ScheduleItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status graph for schedule items.
pub static SCHEDULE_ITEM_MACHINE: StateMachine<ScheduleItemStatus> = StateMachine {
    edges: &[
        (
            ScheduleItemStatus::Pending,
            &[
                ScheduleItemStatus::Due,
                ScheduleItemStatus::Paid,
                ScheduleItemStatus::Overdue,
                ScheduleItemStatus::Waived,
            ],
        ),
        (
            ScheduleItemStatus::Due,
            &[
                ScheduleItemStatus::Paid,
                ScheduleItemStatus::Overdue,
                ScheduleItemStatus::Waived,
            ],
        ),
        (
            ScheduleItemStatus::Overdue,
            &[ScheduleItemStatus::Paid, ScheduleItemStatus::Waived],
        ),
    ],
};

/// One ordered stage of a payment-term template.
#[derive(Debug, Clone)]
pub struct TermStage {
    /// Stage identity within the term.
    pub id: PaymentTermStageId,
    /// Share of the document total, 0-100.
    pub percentage: u8,
    /// Day offset added to the resolved anchor date.
    pub days: u32,
    /// The event or date the stage is due against.
    pub base: CalculationBase,
    /// Ordering within the term.
    pub sort_order: i16,
}

/// A schedule item planned by the generator, not yet persisted.
#[derive(Debug, Clone)]
pub struct PlannedScheduleItem {
    /// The stage this item was generated from.
    pub stage_id: PaymentTermStageId,
    /// Derived human-readable label.
    pub label: String,
    /// Share of the document total, 0-100.
    pub percentage: u8,
    /// Amount in minor units (signed; negative for credit items).
    pub amount_minor: i64,
    /// Currency of the owning document.
    pub currency: Currency,
    /// Due condition.
    pub base: CalculationBase,
    /// Concrete due date, when resolvable at generation time.
    pub due_date: Option<chrono::NaiveDate>,
    /// Whether this item gates a downstream transition.
    pub is_blocking: bool,
    /// Ordering within the schedule.
    pub sort_order: i16,
}

/// View of an existing schedule item used for regeneration planning.
#[derive(Debug, Clone)]
pub struct ExistingScheduleItem {
    /// Item identity.
    pub id: ScheduleItemId,
    /// The stage the item was generated from, if still linked.
    pub stage_id: Option<PaymentTermStageId>,
    /// Current status.
    pub status: ScheduleItemStatus,
    /// Number of allocations referencing the item.
    pub allocation_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_round_trip() {
        for base in [
            CalculationBase::OrderDate,
            CalculationBase::PoDate,
            CalculationBase::InvoiceDate,
            CalculationBase::BeforeProduction,
            CalculationBase::BeforeShipment,
            CalculationBase::AfterShipment,
        ] {
            assert_eq!(CalculationBase::parse(base.as_str()), Some(base));
        }
    }

    #[test]
    fn test_blocking_bases() {
        assert!(CalculationBase::BeforeProduction.is_blocking());
        assert!(CalculationBase::BeforeShipment.is_blocking());
        assert!(CalculationBase::OrderDate.is_blocking());
        assert!(CalculationBase::PoDate.is_blocking());
        assert!(!CalculationBase::InvoiceDate.is_blocking());
        assert!(!CalculationBase::AfterShipment.is_blocking());
    }

    #[test]
    fn test_bases_resolving_at_generation() {
        assert!(CalculationBase::OrderDate.resolves_at_generation());
        assert!(CalculationBase::PoDate.resolves_at_generation());
        assert!(CalculationBase::InvoiceDate.resolves_at_generation());
        assert!(!CalculationBase::BeforeProduction.resolves_at_generation());
        assert!(!CalculationBase::BeforeShipment.resolves_at_generation());
        assert!(!CalculationBase::AfterShipment.resolves_at_generation());
    }

    #[test]
    fn test_item_status_graph() {
        assert!(SCHEDULE_ITEM_MACHINE
            .can_transition(ScheduleItemStatus::Pending, ScheduleItemStatus::Due));
        assert!(SCHEDULE_ITEM_MACHINE
            .can_transition(ScheduleItemStatus::Due, ScheduleItemStatus::Overdue));
        assert!(SCHEDULE_ITEM_MACHINE
            .can_transition(ScheduleItemStatus::Overdue, ScheduleItemStatus::Paid));
        assert!(!SCHEDULE_ITEM_MACHINE
            .can_transition(ScheduleItemStatus::Paid, ScheduleItemStatus::Pending));
        assert!(SCHEDULE_ITEM_MACHINE.is_terminal(ScheduleItemStatus::Paid));
        assert!(SCHEDULE_ITEM_MACHINE.is_terminal(ScheduleItemStatus::Waived));
    }

    #[test]
    fn test_resolved_statuses() {
        assert!(ScheduleItemStatus::Paid.is_resolved());
        assert!(ScheduleItemStatus::Waived.is_resolved());
        assert!(!ScheduleItemStatus::Pending.is_resolved());
        assert!(!ScheduleItemStatus::Overdue.is_resolved());
    }
}
