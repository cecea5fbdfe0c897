//! Payment schedule generation from term templates.
//!
//! Expands a payment term's ordered stages into concrete schedule items
//! for a payable document. Amounts use half-up rounding on integer minor
//! units: `round(total * percentage / 100)` per stage, each stage rounded
//! independently. Percentages that sum to 100 with at most one uneven
//! split keep the amounts summing exactly to the total; the rounding rule
//! itself is half-away-from-zero.

use chrono::{Duration, NaiveDate};

use crate::document::Payable;
use crate::schedule::types::{
    ExistingScheduleItem, PlannedScheduleItem, ScheduleItemStatus, TermStage,
};

/// Rounds `numerator / denominator` half away from zero.
///
/// Operates on `i128` so that `total * percentage` cannot overflow;
/// results outside `i64` saturate (unreachable for percentage inputs,
/// where the result is bounded by the `i64` total).
#[must_use]
pub fn round_half_up(numerator: i128, denominator: i128) -> i64 {
    debug_assert!(denominator > 0);
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    let rounded = if remainder.abs() * 2 >= denominator {
        quotient + numerator.signum()
    } else {
        quotient
    };
    i64::try_from(rounded).unwrap_or(if rounded > 0 { i64::MAX } else { i64::MIN })
}

/// Computes one stage's amount in minor units.
#[must_use]
pub fn stage_amount(total_minor: i64, percentage: u8) -> i64 {
    round_half_up(i128::from(total_minor) * i128::from(percentage), 100)
}

/// Derives the human label for a stage:
/// `"{percentage}% — {condition label}"`, suffixed `" (+{days} days)"`
/// when the stage carries a positive day offset.
#[must_use]
pub fn item_label(stage: &TermStage) -> String {
    let mut label = format!("{}% — {}", stage.percentage, stage.base.label());
    if stage.days > 0 {
        label.push_str(&format!(" (+{} days)", stage.days));
    }
    label
}

/// Computes the stage's due date, when resolvable at generation time.
///
/// Date-anchored bases resolve to the payable's issue date (or creation
/// date when not issued) plus the stage offset. Event-anchored bases
/// (production/shipment) have no due date until the event occurs.
#[must_use]
pub fn stage_due_date(stage: &TermStage, payable: &dyn Payable) -> Option<NaiveDate> {
    if !stage.base.resolves_at_generation() {
        return None;
    }
    let anchor = payable.issue_date().unwrap_or_else(|| payable.created_on());
    Some(anchor + Duration::days(i64::from(stage.days)))
}

/// Expands the term stages into planned schedule items, in sort order.
#[must_use]
pub fn plan_schedule(payable: &dyn Payable, stages: &[TermStage]) -> Vec<PlannedScheduleItem> {
    let total = payable.total();
    let mut ordered: Vec<&TermStage> = stages.iter().collect();
    ordered.sort_by_key(|s| s.sort_order);

    ordered
        .into_iter()
        .map(|stage| PlannedScheduleItem {
            stage_id: stage.id,
            label: item_label(stage),
            percentage: stage.percentage,
            amount_minor: stage_amount(total.minor, stage.percentage),
            currency: total.currency,
            base: stage.base,
            due_date: stage_due_date(stage, payable),
            is_blocking: stage.base.is_blocking(),
            sort_order: stage.sort_order,
        })
        .collect()
}

/// Outcome of regeneration planning: which existing items to delete and
/// which stages to (re)generate.
#[derive(Debug, Clone)]
pub struct RegenerationPlan {
    /// Existing items safe to delete (not paid/waived, zero allocations).
    pub delete: Vec<tradewind_shared::types::ScheduleItemId>,
    /// Items to create for stages not represented among survivors.
    pub create: Vec<PlannedScheduleItem>,
}

/// Plans an incremental regeneration after a payment-term change.
///
/// Items that are paid, waived, or referenced by allocations survive
/// untouched (preserving auditability); everything else is deleted and
/// the generation logic runs only for stages without a surviving item.
#[must_use]
pub fn plan_regeneration(
    payable: &dyn Payable,
    stages: &[TermStage],
    existing: &[ExistingScheduleItem],
) -> RegenerationPlan {
    let (removable, survivors): (Vec<_>, Vec<_>) = existing.iter().partition(|item| {
        !matches!(
            item.status,
            ScheduleItemStatus::Paid | ScheduleItemStatus::Waived
        ) && item.allocation_count == 0
    });

    let surviving_stage_ids: Vec<_> = survivors.iter().filter_map(|item| item.stage_id).collect();

    let create = plan_schedule(payable, stages)
        .into_iter()
        .filter(|planned| !surviving_stage_ids.contains(&planned.stage_id))
        .collect();

    RegenerationPlan {
        delete: removable.into_iter().map(|item| item.id).collect(),
        create,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentType, PayableSnapshot};
    use crate::payment::PaymentDirection;
    use crate::schedule::types::CalculationBase;
    use proptest::prelude::*;
    use tradewind_shared::types::{
        Currency, DocumentId, PaymentTermStageId, ScheduleItemId,
    };

    fn payable(total_minor: i64, issue_date: Option<NaiveDate>) -> PayableSnapshot {
        PayableSnapshot {
            id: DocumentId::new(),
            document_type: DocumentType::ProformaInvoice,
            reference: "PI-2026-00001".to_string(),
            total_minor,
            currency: Currency::Usd,
            direction: PaymentDirection::Inbound,
            issue_date,
            created_on: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        }
    }

    fn stage(percentage: u8, days: u32, base: CalculationBase, sort_order: i16) -> TermStage {
        TermStage {
            id: PaymentTermStageId::new(),
            percentage,
            days,
            base,
            sort_order,
        }
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(5, 10), 1); // 0.5 -> 1
        assert_eq!(round_half_up(4, 10), 0); // 0.4 -> 0
        assert_eq!(round_half_up(15, 10), 2); // 1.5 -> 2
        assert_eq!(round_half_up(25, 10), 3); // 2.5 -> 3 (away from zero, not to even)
        assert_eq!(round_half_up(-5, 10), -1); // -0.5 -> -1 (away from zero)
        assert_eq!(round_half_up(-4, 10), 0);
    }

    #[test]
    fn test_stage_amount_exact_percentages() {
        // total=1000, [30,30,40] -> [300,300,400], sum exactly 1000
        let amounts: Vec<i64> = [30u8, 30, 40]
            .iter()
            .map(|p| stage_amount(1000, *p))
            .collect();
        assert_eq!(amounts, vec![300, 300, 400]);
        assert_eq!(amounts.iter().sum::<i64>(), 1000);
    }

    #[test]
    fn test_stage_amount_uneven_percentages() {
        // total=100, [33,33,34] -> [33,33,34], no drift
        let amounts: Vec<i64> = [33u8, 33, 34]
            .iter()
            .map(|p| stage_amount(100, *p))
            .collect();
        assert_eq!(amounts, vec![33, 33, 34]);
        assert_eq!(amounts.iter().sum::<i64>(), 100);
    }

    #[test]
    fn test_stage_amount_half_up() {
        // 101 * 50% = 50.5 -> 51
        assert_eq!(stage_amount(101, 50), 51);
        // 101 * 25% = 25.25 -> 25
        assert_eq!(stage_amount(101, 25), 25);
    }

    #[test]
    fn test_item_label_without_days() {
        let s = stage(30, 0, CalculationBase::OrderDate, 1);
        assert_eq!(item_label(&s), "30% — order date");
    }

    #[test]
    fn test_item_label_with_days() {
        let s = stage(70, 45, CalculationBase::InvoiceDate, 2);
        assert_eq!(item_label(&s), "70% — invoice date (+45 days)");
    }

    #[test]
    fn test_due_date_from_issue_date() {
        let issue = NaiveDate::from_ymd_opt(2026, 4, 10).unwrap();
        let p = payable(1000, Some(issue));
        let s = stage(50, 30, CalculationBase::InvoiceDate, 1);
        assert_eq!(
            stage_due_date(&s, &p),
            Some(NaiveDate::from_ymd_opt(2026, 5, 10).unwrap())
        );
    }

    #[test]
    fn test_due_date_falls_back_to_creation_date() {
        let p = payable(1000, None);
        let s = stage(50, 0, CalculationBase::OrderDate, 1);
        assert_eq!(
            stage_due_date(&s, &p),
            Some(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
        );
    }

    #[test]
    fn test_event_anchored_bases_have_no_due_date() {
        let p = payable(1000, Some(NaiveDate::from_ymd_opt(2026, 4, 10).unwrap()));
        let s = stage(50, 10, CalculationBase::BeforeShipment, 1);
        assert_eq!(stage_due_date(&s, &p), None);
    }

    #[test]
    fn test_plan_schedule_orders_by_sort_order() {
        let p = payable(10_000, None);
        let stages = vec![
            stage(70, 0, CalculationBase::BeforeShipment, 2),
            stage(30, 0, CalculationBase::OrderDate, 1),
        ];
        let planned = plan_schedule(&p, &stages);
        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].percentage, 30);
        assert_eq!(planned[0].amount_minor, 3_000);
        assert!(planned[0].is_blocking);
        assert_eq!(planned[1].percentage, 70);
        assert_eq!(planned[1].amount_minor, 7_000);
        assert!(planned[1].is_blocking);
        assert!(planned[1].due_date.is_none());
    }

    #[test]
    fn test_plan_schedule_blocking_flags_follow_base() {
        let p = payable(10_000, None);
        let stages = vec![
            stage(50, 0, CalculationBase::AfterShipment, 2),
            stage(50, 0, CalculationBase::BeforeProduction, 1),
        ];
        let planned = plan_schedule(&p, &stages);
        assert!(planned[0].is_blocking);
        assert!(!planned[1].is_blocking);
    }

    #[test]
    fn test_regeneration_preserves_paid_and_allocated_items() {
        let p = payable(10_000, None);
        let stage_a = stage(30, 0, CalculationBase::OrderDate, 1);
        let stage_b = stage(70, 0, CalculationBase::BeforeShipment, 2);
        let stages = vec![stage_a.clone(), stage_b.clone()];

        let existing = vec![
            // Paid item survives
            ExistingScheduleItem {
                id: ScheduleItemId::new(),
                stage_id: Some(stage_a.id),
                status: ScheduleItemStatus::Paid,
                allocation_count: 1,
            },
            // Pending item with an allocation survives
            ExistingScheduleItem {
                id: ScheduleItemId::new(),
                stage_id: Some(stage_b.id),
                status: ScheduleItemStatus::Pending,
                allocation_count: 2,
            },
        ];

        let plan = plan_regeneration(&p, &stages, &existing);
        assert!(plan.delete.is_empty());
        assert!(plan.create.is_empty());
    }

    #[test]
    fn test_regeneration_replaces_unreferenced_pending_items() {
        let p = payable(10_000, None);
        let stage_a = stage(30, 0, CalculationBase::OrderDate, 1);
        let stages = vec![stage_a.clone()];

        let pending_id = ScheduleItemId::new();
        let existing = vec![ExistingScheduleItem {
            id: pending_id,
            stage_id: Some(stage_a.id),
            status: ScheduleItemStatus::Pending,
            allocation_count: 0,
        }];

        let plan = plan_regeneration(&p, &stages, &existing);
        assert_eq!(plan.delete, vec![pending_id]);
        assert_eq!(plan.create.len(), 1);
        assert_eq!(plan.create[0].stage_id, stage_a.id);
    }

    #[test]
    fn test_regeneration_fills_only_missing_stages() {
        let p = payable(10_000, None);
        let stage_a = stage(30, 0, CalculationBase::OrderDate, 1);
        let stage_b = stage(70, 30, CalculationBase::InvoiceDate, 2);
        let stages = vec![stage_a.clone(), stage_b.clone()];

        // Stage A already paid; stage B has no item (added to the term later)
        let existing = vec![ExistingScheduleItem {
            id: ScheduleItemId::new(),
            stage_id: Some(stage_a.id),
            status: ScheduleItemStatus::Paid,
            allocation_count: 1,
        }];

        let plan = plan_regeneration(&p, &stages, &existing);
        assert!(plan.delete.is_empty());
        assert_eq!(plan.create.len(), 1);
        assert_eq!(plan.create[0].stage_id, stage_b.id);
    }

    #[test]
    fn test_regeneration_is_additive_only() {
        // Regenerating twice with an unchanged term never grows the schedule
        let p = payable(10_000, None);
        let stages = vec![
            stage(30, 0, CalculationBase::OrderDate, 1),
            stage(70, 0, CalculationBase::BeforeShipment, 2),
        ];

        let first = plan_regeneration(&p, &stages, &[]);
        assert_eq!(first.create.len(), 2);

        let after_first: Vec<ExistingScheduleItem> = first
            .create
            .iter()
            .map(|planned| ExistingScheduleItem {
                id: ScheduleItemId::new(),
                stage_id: Some(planned.stage_id),
                status: ScheduleItemStatus::Pending,
                allocation_count: 0,
            })
            .collect();

        let second = plan_regeneration(&p, &stages, &after_first);
        // Unreferenced pending items churn, but the net count is unchanged
        assert_eq!(second.create.len(), second.delete.len());
    }

    proptest! {
        /// For percentages summing to 100 with a single uneven remainder
        /// pattern, per-stage half-up rounding never drifts by more than
        /// one minor unit per stage.
        #[test]
        fn prop_stage_amounts_bounded_drift(
            total in 0i64..10_000_000,
            p1 in 0u8..=100,
        ) {
            let p2 = 100 - p1;
            let sum = stage_amount(total, p1) + stage_amount(total, p2);
            // Two-way splits of 100% round in opposite directions
            prop_assert!((sum - total).abs() <= 1);
        }

        /// A stage amount never exceeds the document total.
        #[test]
        fn prop_stage_amount_within_total(
            total in 0i64..10_000_000,
            pct in 0u8..=100,
        ) {
            let amount = stage_amount(total, pct);
            prop_assert!(amount >= 0);
            prop_assert!(amount <= total);
        }
    }
}
