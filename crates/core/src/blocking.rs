//! Blocking-condition evaluation.
//!
//! Unresolved blocking schedule items gate specific downstream status
//! transitions per a fixed mapping, and a stricter subset gates purchase
//! order generation. The document transition path runs
//! [`blocking_items_for`] as a mandatory pre-transition hook, so the check
//! cannot be bypassed by callers.

use serde::{Deserialize, Serialize};

use tradewind_shared::types::ScheduleItemId;

use crate::document::TradeStatus;
use crate::schedule::types::{CalculationBase, ScheduleItemStatus};

/// View of a schedule item for blocking evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockingItemView {
    /// Item identity.
    pub id: ScheduleItemId,
    /// Item label (surfaced to the user when the item blocks).
    pub label: String,
    /// Due condition.
    pub base: CalculationBase,
    /// Current status.
    pub status: ScheduleItemStatus,
    /// Whether the item gates transitions at all.
    pub is_blocking: bool,
}

/// The status transition gated by a calculation base, if any.
#[must_use]
pub const fn blocked_target(base: CalculationBase) -> Option<TradeStatus> {
    match base {
        CalculationBase::BeforeProduction => Some(TradeStatus::InProduction),
        CalculationBase::BeforeShipment => Some(TradeStatus::Shipped),
        CalculationBase::OrderDate | CalculationBase::PoDate => Some(TradeStatus::Confirmed),
        CalculationBase::InvoiceDate | CalculationBase::AfterShipment => None,
    }
}

/// Returns the items that block a transition to `target`.
///
/// An item blocks iff it is flagged blocking, is neither paid nor waived,
/// and its due condition maps to exactly that target status.
#[must_use]
pub fn blocking_items_for(
    items: &[BlockingItemView],
    target: TradeStatus,
) -> Vec<&BlockingItemView> {
    items
        .iter()
        .filter(|item| {
            item.is_blocking
                && !item.status.is_resolved()
                && blocked_target(item.base) == Some(target)
        })
        .collect()
}

/// Returns the items that block purchase order generation.
///
/// Stricter subset: shipment-gating items do not block PO creation.
#[must_use]
pub fn blocks_purchase_order_generation(items: &[BlockingItemView]) -> Vec<&BlockingItemView> {
    items
        .iter()
        .filter(|item| {
            item.is_blocking
                && !item.status.is_resolved()
                && matches!(
                    item.base,
                    CalculationBase::BeforeProduction
                        | CalculationBase::OrderDate
                        | CalculationBase::PoDate
                )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(
        base: CalculationBase,
        status: ScheduleItemStatus,
        is_blocking: bool,
    ) -> BlockingItemView {
        BlockingItemView {
            id: ScheduleItemId::new(),
            label: format!("30% — {}", base.label()),
            base,
            status,
            is_blocking,
        }
    }

    #[test]
    fn test_before_shipment_blocks_shipped_only() {
        let items = vec![item(
            CalculationBase::BeforeShipment,
            ScheduleItemStatus::Pending,
            true,
        )];
        assert_eq!(blocking_items_for(&items, TradeStatus::Shipped).len(), 1);
        assert!(blocking_items_for(&items, TradeStatus::Confirmed).is_empty());
        assert!(blocking_items_for(&items, TradeStatus::InProduction).is_empty());
    }

    #[test]
    fn test_order_and_po_dates_block_confirmed() {
        let items = vec![
            item(CalculationBase::OrderDate, ScheduleItemStatus::Due, true),
            item(CalculationBase::PoDate, ScheduleItemStatus::Overdue, true),
        ];
        assert_eq!(blocking_items_for(&items, TradeStatus::Confirmed).len(), 2);
        assert!(blocking_items_for(&items, TradeStatus::Shipped).is_empty());
    }

    #[test]
    fn test_before_production_blocks_in_production() {
        let items = vec![item(
            CalculationBase::BeforeProduction,
            ScheduleItemStatus::Pending,
            true,
        )];
        assert_eq!(
            blocking_items_for(&items, TradeStatus::InProduction).len(),
            1
        );
    }

    #[test]
    fn test_waived_items_block_nothing() {
        let items = vec![item(
            CalculationBase::BeforeShipment,
            ScheduleItemStatus::Waived,
            true,
        )];
        assert!(blocking_items_for(&items, TradeStatus::Shipped).is_empty());
        assert!(blocks_purchase_order_generation(&items).is_empty());
    }

    #[test]
    fn test_paid_items_block_nothing() {
        let items = vec![item(
            CalculationBase::OrderDate,
            ScheduleItemStatus::Paid,
            true,
        )];
        assert!(blocking_items_for(&items, TradeStatus::Confirmed).is_empty());
    }

    #[test]
    fn test_non_blocking_items_are_ignored() {
        let items = vec![item(
            CalculationBase::BeforeShipment,
            ScheduleItemStatus::Pending,
            false,
        )];
        assert!(blocking_items_for(&items, TradeStatus::Shipped).is_empty());
    }

    #[test]
    fn test_po_generation_excludes_shipment_gating_items() {
        let items = vec![
            item(
                CalculationBase::BeforeShipment,
                ScheduleItemStatus::Pending,
                true,
            ),
            item(
                CalculationBase::BeforeProduction,
                ScheduleItemStatus::Pending,
                true,
            ),
            item(CalculationBase::OrderDate, ScheduleItemStatus::Due, true),
        ];
        let blockers = blocks_purchase_order_generation(&items);
        assert_eq!(blockers.len(), 2);
        assert!(blockers
            .iter()
            .all(|b| b.base != CalculationBase::BeforeShipment));
    }

    #[test]
    fn test_unblocked_targets() {
        assert_eq!(blocked_target(CalculationBase::InvoiceDate), None);
        assert_eq!(blocked_target(CalculationBase::AfterShipment), None);
    }
}
