//! Money type in integer minor units with currency.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All engine amounts are `i64` minor units (cents); `Decimal` is used
//! only at presentation edges when converting to/from major units.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Represents a monetary amount with currency.
///
/// The amount is always in the smallest currency unit (e.g., cents),
/// so arithmetic is exact integer arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount in the smallest currency unit (e.g., cents).
    pub minor: i64,
    /// ISO 4217 currency code (e.g., "USD", "BRL").
    pub currency: Currency,
}

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// British Pound
    Gbp,
    /// Chinese Yuan
    Cny,
    /// Japanese Yen
    Jpy,
    /// Brazilian Real
    Brl,
}

impl Currency {
    /// Number of minor-unit decimal places for this currency.
    #[must_use]
    pub const fn decimals(&self) -> u32 {
        match self {
            Self::Jpy => 0,
            _ => 2,
        }
    }

    /// Returns the string representation of the currency code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Cny => "CNY",
            Self::Jpy => "JPY",
            Self::Brl => "BRL",
        }
    }

    /// Parses a currency from a 3-letter code.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "USD" => Some(Self::Usd),
            "EUR" => Some(Self::Eur),
            "GBP" => Some(Self::Gbp),
            "CNY" => Some(Self::Cny),
            "JPY" => Some(Self::Jpy),
            "BRL" => Some(Self::Brl),
            _ => None,
        }
    }
}

impl Money {
    /// Creates a new Money instance from minor units.
    #[must_use]
    pub const fn new(minor: i64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self { minor: 0, currency }
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.minor < 0
    }

    /// Checked addition. Returns `None` on currency mismatch or overflow.
    #[must_use]
    pub fn checked_add(&self, other: Self) -> Option<Self> {
        if self.currency != other.currency {
            return None;
        }
        self.minor
            .checked_add(other.minor)
            .map(|minor| Self::new(minor, self.currency))
    }

    /// Checked subtraction. Returns `None` on currency mismatch or overflow.
    #[must_use]
    pub fn checked_sub(&self, other: Self) -> Option<Self> {
        if self.currency != other.currency {
            return None;
        }
        self.minor
            .checked_sub(other.minor)
            .map(|minor| Self::new(minor, self.currency))
    }

    /// Converts to major units for display (e.g., 12345 cents -> 123.45).
    #[must_use]
    pub fn to_major(&self) -> Decimal {
        Decimal::new(self.minor, self.currency.decimals())
    }

    /// Creates a Money from a major-unit decimal, rounding to the
    /// currency's minor unit with banker's rounding.
    ///
    /// Returns `None` if the value does not fit in `i64` minor units.
    #[must_use]
    pub fn from_major(major: Decimal, currency: Currency) -> Option<Self> {
        let scaled = major * Decimal::from(10i64.pow(currency.decimals()));
        scaled
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .to_i64()
            .map(|minor| Self::new(minor, currency))
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown currency: {s}"))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.to_major(), self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_money_new() {
        let money = Money::new(12345, Currency::Usd);
        assert_eq!(money.minor, 12345);
        assert_eq!(money.currency, Currency::Usd);
    }

    #[test]
    fn test_money_zero() {
        let money = Money::zero(Currency::Brl);
        assert!(money.is_zero());
        assert_eq!(money.minor, 0);
        assert_eq!(money.currency, Currency::Brl);
    }

    #[test]
    fn test_money_is_negative() {
        assert!(!Money::new(10, Currency::Usd).is_negative());
        assert!(Money::new(-10, Currency::Usd).is_negative());
        assert!(!Money::zero(Currency::Usd).is_negative());
    }

    #[test]
    fn test_checked_add_same_currency() {
        let a = Money::new(100, Currency::Eur);
        let b = Money::new(250, Currency::Eur);
        assert_eq!(a.checked_add(b), Some(Money::new(350, Currency::Eur)));
    }

    #[test]
    fn test_checked_add_currency_mismatch() {
        let a = Money::new(100, Currency::Eur);
        let b = Money::new(250, Currency::Usd);
        assert_eq!(a.checked_add(b), None);
    }

    #[test]
    fn test_checked_sub_overflow() {
        let a = Money::new(i64::MIN, Currency::Usd);
        let b = Money::new(1, Currency::Usd);
        assert_eq!(a.checked_sub(b), None);
    }

    #[test]
    fn test_to_major_two_decimals() {
        let money = Money::new(12345, Currency::Usd);
        assert_eq!(money.to_major(), dec!(123.45));
    }

    #[test]
    fn test_to_major_zero_decimals() {
        // JPY has no minor unit
        let money = Money::new(12345, Currency::Jpy);
        assert_eq!(money.to_major(), dec!(12345));
    }

    #[test]
    fn test_from_major_round_trip() {
        let money = Money::from_major(dec!(123.45), Currency::Usd).unwrap();
        assert_eq!(money.minor, 12345);
        assert_eq!(money.to_major(), dec!(123.45));
    }

    #[test]
    fn test_from_major_rounds_to_minor_unit() {
        // 1.005 at 2dp with banker's rounding -> 1.00 -> 100 cents
        let money = Money::from_major(dec!(1.005), Currency::Usd).unwrap();
        assert_eq!(money.minor, 100);
    }

    #[test]
    fn test_currency_display() {
        assert_eq!(Currency::Usd.to_string(), "USD");
        assert_eq!(Currency::Eur.to_string(), "EUR");
        assert_eq!(Currency::Gbp.to_string(), "GBP");
        assert_eq!(Currency::Cny.to_string(), "CNY");
        assert_eq!(Currency::Jpy.to_string(), "JPY");
        assert_eq!(Currency::Brl.to_string(), "BRL");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(Currency::from_str("USD").unwrap(), Currency::Usd);
        assert_eq!(Currency::from_str("usd").unwrap(), Currency::Usd);
        assert_eq!(Currency::from_str("BRL").unwrap(), Currency::Brl);

        assert!(Currency::from_str("XXX").is_err());
        assert!(Currency::from_str("").is_err());
    }

    #[test]
    fn test_currency_decimals() {
        assert_eq!(Currency::Usd.decimals(), 2);
        assert_eq!(Currency::Jpy.decimals(), 0);
    }
}
