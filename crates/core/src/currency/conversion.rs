//! Minor-unit currency conversion.
//!
//! CRITICAL: Rounding strategy for multi-currency:
//! - Always round to the target currency's minor unit
//! - Use banker's rounding (round half to even)
//! - Store both original and converted amounts

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use tradewind_shared::types::Currency;

/// Converts an integer minor-unit amount between currencies.
///
/// Scale-aware: the amount is lifted to major units of `from`, multiplied
/// by the rate, and rounded to the minor unit of `to` with banker's
/// rounding. Returns `None` on decimal overflow.
#[must_use]
pub fn convert_minor(amount_minor: i64, from: Currency, to: Currency, rate: Decimal) -> Option<i64> {
    let major = Decimal::new(amount_minor, from.decimals());
    let converted = major.checked_mul(rate)?;
    let scaled = converted.checked_mul(Decimal::from(10i64.pow(to.decimals())))?;
    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .to_i64()
}

/// Converts a major-unit amount with the given rate and precision.
///
/// Uses banker's rounding (round half to even) to minimize cumulative
/// errors.
#[must_use]
pub fn convert_major(amount: Decimal, rate: Decimal, decimal_places: u32) -> Decimal {
    (amount * rate).round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_convert_minor_same_scale() {
        // 100.00 USD at 0.9 -> 90.00 EUR
        let result = convert_minor(10_000, Currency::Usd, Currency::Eur, dec!(0.9));
        assert_eq!(result, Some(9_000));
    }

    #[test]
    fn test_convert_minor_to_zero_decimal_currency() {
        // 100.00 USD at 150.5 -> 15050 JPY (no minor unit)
        let result = convert_minor(10_000, Currency::Usd, Currency::Jpy, dec!(150.5));
        assert_eq!(result, Some(15_050));
    }

    #[test]
    fn test_convert_minor_from_zero_decimal_currency() {
        // 1000 JPY at 0.0067 -> 6.70 USD
        let result = convert_minor(1_000, Currency::Jpy, Currency::Usd, dec!(0.0067));
        assert_eq!(result, Some(670));
    }

    #[test]
    fn test_convert_minor_bankers_rounding() {
        // 0.01 USD at 0.5 -> 0.005 EUR -> rounds to 0.00 (half to even)
        let result = convert_minor(1, Currency::Usd, Currency::Eur, dec!(0.5));
        assert_eq!(result, Some(0));
        // 0.03 USD at 0.5 -> 0.015 EUR -> rounds to 0.02
        let result = convert_minor(3, Currency::Usd, Currency::Eur, dec!(0.5));
        assert_eq!(result, Some(2));
    }

    #[test]
    fn test_convert_minor_triangulated_rate() {
        // 100 EUR at (1/0.9)*5.0 = 5.5555... -> 555.56 BRL
        let rate = (Decimal::ONE / dec!(0.9)) * dec!(5.0);
        let result = convert_minor(10_000, Currency::Eur, Currency::Brl, rate);
        assert_eq!(result, Some(55_556));
    }

    #[test]
    fn test_convert_major() {
        // 100.50 * 15000.5 = 1,507,550.25 -> rounds to 1,507,550
        assert_eq!(convert_major(dec!(100.50), dec!(15000.5), 0), dec!(1507550));
    }

    #[test]
    fn test_convert_major_bankers_rounding() {
        // 2.5 rounds to 2, 3.5 rounds to 4
        assert_eq!(convert_major(dec!(1), dec!(2.5), 0), dec!(2));
        assert_eq!(convert_major(dec!(1), dec!(3.5), 0), dec!(4));
    }
}
