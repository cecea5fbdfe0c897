//! Payment allocation checks and balance math.
//!
//! The persistence layer serializes allocations per document with a row
//! lock; the functions here are the pure checks and arithmetic it runs
//! under that lock. Balances are always derived from allocation sums -
//! the cached `paid_amount` on a document is a display convenience, never
//! an input to a correctness check.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use tradewind_shared::types::Currency;

use crate::currency::{convert_minor, RateTable};
use crate::payment::PaymentStatus;

/// Errors from allocation validation.
#[derive(Debug, Clone, Error)]
pub enum AllocationError {
    /// Allocation amount must be positive.
    #[error("Allocation amount must be positive, got {0}")]
    InvalidAmount(i64),

    /// Only approved payments may be allocated.
    #[error("Payment is {status}, only approved payments can be allocated")]
    PaymentNotApproved {
        /// The payment's current status.
        status: PaymentStatus,
    },

    /// Allocation would exceed the document's remaining balance.
    #[error(
        "Allocating {requested} to {document_reference} exceeds the remaining balance {remaining} by {excess}"
    )]
    Overflow {
        /// Requested amount in document currency minor units.
        requested: i64,
        /// Remaining balance before this allocation.
        remaining: i64,
        /// Amount by which the request exceeds the balance.
        excess: i64,
        /// The document being over-allocated.
        document_reference: String,
    },

    /// Allocation would exceed the schedule item's amount.
    #[error(
        "Allocating {requested} to item '{item_label}' exceeds its remaining amount {remaining}"
    )]
    ItemOverflow {
        /// Requested amount in document currency minor units.
        requested: i64,
        /// The item's remaining amount before this allocation.
        remaining: i64,
        /// The over-allocated item's label.
        item_label: String,
    },

    /// The converted amount did not fit the numeric range.
    #[error("Currency conversion overflowed for amount {0}")]
    ConversionOverflow(i64),
}

impl AllocationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount(_) => 400,
            Self::PaymentNotApproved { .. } | Self::Overflow { .. } | Self::ItemOverflow { .. } => {
                422
            }
            Self::ConversionOverflow(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::PaymentNotApproved { .. } => "PAYMENT_NOT_APPROVED",
            Self::Overflow { .. } => "ALLOCATION_OVERFLOW",
            Self::ItemOverflow { .. } => "ITEM_ALLOCATION_OVERFLOW",
            Self::ConversionOverflow(_) => "CONVERSION_OVERFLOW",
        }
    }
}

/// Minimal view of an allocation used for balance derivation.
#[derive(Debug, Clone, Copy)]
pub struct AllocationView {
    /// Allocated amount expressed in the document currency.
    pub amount_in_document_currency: i64,
    /// Status of the allocating payment.
    pub payment_status: PaymentStatus,
}

/// Sum of allocations whose payment is approved.
///
/// This is the single source of truth for paid balances.
#[must_use]
pub fn paid_amount(allocations: &[AllocationView]) -> i64 {
    allocations
        .iter()
        .filter(|a| a.payment_status == PaymentStatus::Approved)
        .map(|a| a.amount_in_document_currency)
        .sum()
}

/// Remaining balance, floored at zero.
#[must_use]
pub fn remaining_amount(amount: i64, paid: i64) -> i64 {
    (amount - paid).max(0)
}

/// Whether the balance is fully covered.
#[must_use]
pub fn is_paid_in_full(amount: i64, paid: i64) -> bool {
    amount - paid <= 0
}

/// Validates the requested allocation amount.
pub fn check_amount(amount: i64) -> Result<(), AllocationError> {
    if amount <= 0 {
        return Err(AllocationError::InvalidAmount(amount));
    }
    Ok(())
}

/// Validates that the payment may be allocated at all.
pub fn check_payment_status(status: PaymentStatus) -> Result<(), AllocationError> {
    if status != PaymentStatus::Approved {
        return Err(AllocationError::PaymentNotApproved { status });
    }
    Ok(())
}

/// Rejects an allocation that would exceed the document's remaining
/// balance. Nothing may be persisted when this fails - no partial
/// allocation exists on overflow.
pub fn check_document_overflow(
    requested: i64,
    document_total: i64,
    document_paid: i64,
    document_reference: &str,
) -> Result<(), AllocationError> {
    let remaining = document_total - document_paid;
    if requested > remaining {
        return Err(AllocationError::Overflow {
            requested,
            remaining,
            excess: requested - remaining,
            document_reference: document_reference.to_string(),
        });
    }
    Ok(())
}

/// Rejects an allocation that would exceed the schedule item's amount.
///
/// Credit items (negative amounts) are exempt: they represent balance
/// corrections, not receivables with a cap.
pub fn check_item_overflow(
    requested: i64,
    item_amount: i64,
    item_paid: i64,
    item_label: &str,
) -> Result<(), AllocationError> {
    if item_amount < 0 {
        return Ok(());
    }
    let remaining = item_amount - item_paid;
    if requested > remaining {
        return Err(AllocationError::ItemOverflow {
            requested,
            remaining,
            item_label: item_label.to_string(),
        });
    }
    Ok(())
}

/// Outcome of converting an allocation amount into document currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertedAllocation {
    /// Amount expressed in the document currency, minor units.
    pub amount_in_document_currency: i64,
    /// The exchange rate applied.
    pub rate: Decimal,
    /// True when no rate was resolvable and amounts were treated 1:1.
    ///
    /// A documented degradation, not a silent success - surface it.
    pub rate_fallback: bool,
}

/// Converts an allocation amount from payment currency to document
/// currency.
///
/// Preference order: explicit rate, then the latest approved rate via the
/// base-currency table, then the documented 1:1 degradation flagged with
/// `rate_fallback`.
pub fn convert_allocation(
    amount: i64,
    payment_currency: Currency,
    document_currency: Currency,
    explicit_rate: Option<Decimal>,
    table: &RateTable,
    as_of: NaiveDate,
) -> Result<ConvertedAllocation, AllocationError> {
    if payment_currency == document_currency {
        return Ok(ConvertedAllocation {
            amount_in_document_currency: amount,
            rate: Decimal::ONE,
            rate_fallback: false,
        });
    }

    let rate = explicit_rate.or_else(|| {
        table
            .resolve(payment_currency, document_currency, as_of)
            .map(|resolved| resolved.rate)
    });

    match rate {
        Some(rate) => {
            let converted = convert_minor(amount, payment_currency, document_currency, rate)
                .ok_or(AllocationError::ConversionOverflow(amount))?;
            Ok(ConvertedAllocation {
                amount_in_document_currency: converted,
                rate,
                rate_fallback: false,
            })
        }
        None => Ok(ConvertedAllocation {
            amount_in_document_currency: amount,
            rate: Decimal::ONE,
            rate_fallback: true,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn approved(amount: i64) -> AllocationView {
        AllocationView {
            amount_in_document_currency: amount,
            payment_status: PaymentStatus::Approved,
        }
    }

    #[test]
    fn test_paid_amount_counts_only_approved_payments() {
        let allocations = vec![
            approved(3_000),
            AllocationView {
                amount_in_document_currency: 2_000,
                payment_status: PaymentStatus::PendingApproval,
            },
            AllocationView {
                amount_in_document_currency: 1_000,
                payment_status: PaymentStatus::Cancelled,
            },
            approved(500),
        ];
        assert_eq!(paid_amount(&allocations), 3_500);
    }

    #[test]
    fn test_remaining_amount_floors_at_zero() {
        assert_eq!(remaining_amount(1_000, 400), 600);
        assert_eq!(remaining_amount(1_000, 1_000), 0);
        assert_eq!(remaining_amount(1_000, 1_200), 0);
    }

    #[test]
    fn test_is_paid_in_full() {
        assert!(!is_paid_in_full(1_000, 999));
        assert!(is_paid_in_full(1_000, 1_000));
        assert!(is_paid_in_full(1_000, 1_001));
    }

    #[test]
    fn test_check_amount_rejects_non_positive() {
        assert!(matches!(
            check_amount(0),
            Err(AllocationError::InvalidAmount(0))
        ));
        assert!(matches!(
            check_amount(-50),
            Err(AllocationError::InvalidAmount(-50))
        ));
        assert!(check_amount(1).is_ok());
    }

    #[test]
    fn test_check_payment_status() {
        assert!(check_payment_status(PaymentStatus::Approved).is_ok());
        for status in [
            PaymentStatus::PendingApproval,
            PaymentStatus::Rejected,
            PaymentStatus::Cancelled,
        ] {
            assert!(matches!(
                check_payment_status(status),
                Err(AllocationError::PaymentNotApproved { .. })
            ));
        }
    }

    #[test]
    fn test_document_overflow_names_excess_and_document() {
        let err = check_document_overflow(5_000, 10_000, 7_000, "PI-2026-00042").unwrap_err();
        match err {
            AllocationError::Overflow {
                requested,
                remaining,
                excess,
                document_reference,
            } => {
                assert_eq!(requested, 5_000);
                assert_eq!(remaining, 3_000);
                assert_eq!(excess, 2_000);
                assert_eq!(document_reference, "PI-2026-00042");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_document_overflow_allows_exact_fill() {
        assert!(check_document_overflow(3_000, 10_000, 7_000, "PI-2026-00042").is_ok());
    }

    #[test]
    fn test_item_overflow() {
        assert!(check_item_overflow(500, 1_000, 400, "30% — order date").is_ok());
        assert!(matches!(
            check_item_overflow(700, 1_000, 400, "30% — order date"),
            Err(AllocationError::ItemOverflow { remaining: 600, .. })
        ));
    }

    #[test]
    fn test_credit_items_are_exempt_from_item_cap() {
        assert!(check_item_overflow(500, -1_000, 0, "credit note").is_ok());
    }

    #[test]
    fn test_convert_allocation_same_currency() {
        let table = RateTable::new(Currency::Usd, vec![]);
        let result = convert_allocation(
            10_000,
            Currency::Usd,
            Currency::Usd,
            None,
            &table,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        )
        .unwrap();
        assert_eq!(result.amount_in_document_currency, 10_000);
        assert_eq!(result.rate, Decimal::ONE);
        assert!(!result.rate_fallback);
    }

    #[test]
    fn test_convert_allocation_explicit_rate_wins() {
        use crate::currency::StoredRate;
        let table = RateTable::new(
            Currency::Usd,
            vec![StoredRate {
                from: Currency::Usd,
                to: Currency::Eur,
                rate: dec!(0.5),
                effective_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            }],
        );
        let result = convert_allocation(
            10_000,
            Currency::Usd,
            Currency::Eur,
            Some(dec!(0.9)),
            &table,
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        )
        .unwrap();
        assert_eq!(result.rate, dec!(0.9));
        assert_eq!(result.amount_in_document_currency, 9_000);
        assert!(!result.rate_fallback);
    }

    #[test]
    fn test_convert_allocation_falls_back_one_to_one() {
        let table = RateTable::new(Currency::Usd, vec![]);
        let result = convert_allocation(
            10_000,
            Currency::Eur,
            Currency::Brl,
            None,
            &table,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        )
        .unwrap();
        assert_eq!(result.amount_in_document_currency, 10_000);
        assert_eq!(result.rate, Decimal::ONE);
        assert!(result.rate_fallback);
    }

    proptest! {
        /// Running the overflow check before every allocation keeps the
        /// allocated sum within the document total, whatever the request
        /// sequence.
        #[test]
        fn prop_no_double_spend(
            total in 1i64..1_000_000,
            requests in prop::collection::vec(1i64..100_000, 1..50),
        ) {
            let mut paid = 0i64;
            for request in requests {
                if check_document_overflow(request, total, paid, "DOC").is_ok() {
                    paid += request;
                }
            }
            prop_assert!(paid <= total);
        }

        /// Remaining balance is never negative and never exceeds the
        /// item amount.
        #[test]
        fn prop_remaining_bounds(amount in 0i64..1_000_000, paid in 0i64..2_000_000) {
            let remaining = remaining_amount(amount, paid);
            prop_assert!(remaining >= 0);
            prop_assert!(remaining <= amount);
        }
    }
}
