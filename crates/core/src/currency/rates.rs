//! Exchange-rate resolution against a designated base currency.
//!
//! All stored rates involve the base currency (the external feed returns
//! rates relative to it; manual entries follow the same convention). A
//! cross rate between two non-base currencies is triangulated:
//! `amount * (1/rate(base->from)) * rate(base->to)`.
//!
//! Only approved rates belong in the table; the persistence layer filters
//! before building it. Missing rates resolve to `None` - fallback policy
//! is the caller's decision.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradewind_shared::types::Currency;

/// One approved exchange-rate record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRate {
    /// Source currency.
    pub from: Currency,
    /// Target currency.
    pub to: Currency,
    /// Exchange rate (1 `from` = `rate` `to`). Always positive.
    pub rate: Decimal,
    /// Date this rate is effective.
    pub effective_date: NaiveDate,
}

/// How a rate was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLookupMethod {
    /// A stored rate was used as-is.
    Direct,
    /// A stored rate for the opposite direction was inverted.
    Inverse,
    /// Both legs resolved through the base currency.
    Triangulated,
}

/// Result of a rate resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRate {
    /// The resolved exchange rate.
    pub rate: Decimal,
    /// How the rate was obtained.
    pub method: RateLookupMethod,
}

/// In-memory table of approved rates, resolved against one base currency.
#[derive(Debug, Clone)]
pub struct RateTable {
    base: Currency,
    rates: Vec<StoredRate>,
}

impl RateTable {
    /// Builds a table over approved rates.
    ///
    /// Non-positive rates are discarded; they can never be applied or
    /// inverted.
    #[must_use]
    pub fn new(base: Currency, rates: Vec<StoredRate>) -> Self {
        Self {
            base,
            rates: rates
                .into_iter()
                .filter(|r| r.rate > Decimal::ZERO)
                .collect(),
        }
    }

    /// The designated base currency.
    #[must_use]
    pub const fn base_currency(&self) -> Currency {
        self.base
    }

    /// Resolves the rate from one currency to another as of a date.
    ///
    /// Returns `None` when any required leg is missing.
    #[must_use]
    pub fn resolve(&self, from: Currency, to: Currency, as_of: NaiveDate) -> Option<ResolvedRate> {
        if from == to {
            return Some(ResolvedRate {
                rate: Decimal::ONE,
                method: RateLookupMethod::Direct,
            });
        }

        if from == self.base {
            let (rate, method) = self.rate_from_base(to, as_of)?;
            return Some(ResolvedRate { rate, method });
        }

        if to == self.base {
            let (rate, method) = self.rate_from_base(from, as_of)?;
            // rate(from -> base) is the inversion of rate(base -> from);
            // a stored from->base row therefore counts as direct.
            return Some(ResolvedRate {
                rate: Decimal::ONE / rate,
                method: match method {
                    RateLookupMethod::Direct => RateLookupMethod::Inverse,
                    _ => RateLookupMethod::Direct,
                },
            });
        }

        let (base_to_from, _) = self.rate_from_base(from, as_of)?;
        let (base_to_to, _) = self.rate_from_base(to, as_of)?;
        Some(ResolvedRate {
            rate: (Decimal::ONE / base_to_from) * base_to_to,
            method: RateLookupMethod::Triangulated,
        })
    }

    /// Resolves `rate(base -> to)` from a stored direct or inverse row.
    fn rate_from_base(&self, to: Currency, as_of: NaiveDate) -> Option<(Decimal, RateLookupMethod)> {
        if to == self.base {
            return Some((Decimal::ONE, RateLookupMethod::Direct));
        }

        if let Some(direct) = self.best(self.base, to, as_of) {
            return Some((direct.rate, RateLookupMethod::Direct));
        }

        if let Some(inverse) = self.best(to, self.base, as_of) {
            return Some((Decimal::ONE / inverse.rate, RateLookupMethod::Inverse));
        }

        None
    }

    /// Finds the most recent rate for the pair on or before the date.
    fn best(&self, from: Currency, to: Currency, as_of: NaiveDate) -> Option<&StoredRate> {
        self.rates
            .iter()
            .filter(|r| r.from == from && r.to == to && r.effective_date <= as_of)
            .max_by_key(|r| r.effective_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rate(from: Currency, to: Currency, r: Decimal, effective: NaiveDate) -> StoredRate {
        StoredRate {
            from,
            to,
            rate: r,
            effective_date: effective,
        }
    }

    #[test]
    fn test_same_currency_is_identity() {
        let table = RateTable::new(Currency::Usd, vec![]);
        let resolved = table
            .resolve(Currency::Eur, Currency::Eur, date(2026, 1, 1))
            .unwrap();
        assert_eq!(resolved.rate, Decimal::ONE);
        assert_eq!(resolved.method, RateLookupMethod::Direct);
    }

    #[test]
    fn test_direct_from_base() {
        let table = RateTable::new(
            Currency::Usd,
            vec![rate(Currency::Usd, Currency::Eur, dec!(0.9), date(2026, 1, 1))],
        );
        let resolved = table
            .resolve(Currency::Usd, Currency::Eur, date(2026, 1, 15))
            .unwrap();
        assert_eq!(resolved.rate, dec!(0.9));
        assert_eq!(resolved.method, RateLookupMethod::Direct);
    }

    #[test]
    fn test_inverse_to_base() {
        let table = RateTable::new(
            Currency::Usd,
            vec![rate(Currency::Usd, Currency::Eur, dec!(0.9), date(2026, 1, 1))],
        );
        let resolved = table
            .resolve(Currency::Eur, Currency::Usd, date(2026, 1, 15))
            .unwrap();
        assert_eq!(resolved.rate, Decimal::ONE / dec!(0.9));
        assert_eq!(resolved.method, RateLookupMethod::Inverse);
    }

    #[test]
    fn test_triangulation_through_base() {
        // USD base, USD->EUR = 0.9, USD->BRL = 5.0
        // EUR -> BRL = (1/0.9) * 5.0 = 5.5555...
        let table = RateTable::new(
            Currency::Usd,
            vec![
                rate(Currency::Usd, Currency::Eur, dec!(0.9), date(2026, 1, 1)),
                rate(Currency::Usd, Currency::Brl, dec!(5.0), date(2026, 1, 1)),
            ],
        );
        let resolved = table
            .resolve(Currency::Eur, Currency::Brl, date(2026, 1, 15))
            .unwrap();
        assert_eq!(resolved.method, RateLookupMethod::Triangulated);
        assert_eq!(resolved.rate, (Decimal::ONE / dec!(0.9)) * dec!(5.0));
    }

    #[test]
    fn test_triangulation_with_inverse_legs() {
        // Only EUR->USD and BRL->USD stored; both legs need inversion
        let table = RateTable::new(
            Currency::Usd,
            vec![
                rate(Currency::Eur, Currency::Usd, dec!(1.10), date(2026, 1, 1)),
                rate(Currency::Brl, Currency::Usd, dec!(0.20), date(2026, 1, 1)),
            ],
        );
        let resolved = table
            .resolve(Currency::Eur, Currency::Brl, date(2026, 1, 15))
            .unwrap();
        assert_eq!(resolved.method, RateLookupMethod::Triangulated);
        // base->EUR = 1/1.10, base->BRL = 1/0.20
        let expected = (Decimal::ONE / (Decimal::ONE / dec!(1.10))) * (Decimal::ONE / dec!(0.20));
        assert_eq!(resolved.rate, expected);
    }

    #[test]
    fn test_missing_leg_returns_none() {
        let table = RateTable::new(
            Currency::Usd,
            vec![rate(Currency::Usd, Currency::Eur, dec!(0.9), date(2026, 1, 1))],
        );
        assert!(table
            .resolve(Currency::Eur, Currency::Brl, date(2026, 1, 15))
            .is_none());
    }

    #[test]
    fn test_most_recent_on_or_before_date_wins() {
        let table = RateTable::new(
            Currency::Usd,
            vec![
                rate(Currency::Usd, Currency::Eur, dec!(0.85), date(2026, 1, 1)),
                rate(Currency::Usd, Currency::Eur, dec!(0.90), date(2026, 1, 10)),
                // Future rate must not be picked up
                rate(Currency::Usd, Currency::Eur, dec!(0.95), date(2026, 1, 20)),
            ],
        );
        let resolved = table
            .resolve(Currency::Usd, Currency::Eur, date(2026, 1, 15))
            .unwrap();
        assert_eq!(resolved.rate, dec!(0.90));
    }

    #[test]
    fn test_rate_dated_after_as_of_is_invisible() {
        let table = RateTable::new(
            Currency::Usd,
            vec![rate(Currency::Usd, Currency::Eur, dec!(0.9), date(2026, 2, 1))],
        );
        assert!(table
            .resolve(Currency::Usd, Currency::Eur, date(2026, 1, 15))
            .is_none());
    }

    #[test]
    fn test_non_positive_rates_are_discarded() {
        let table = RateTable::new(
            Currency::Usd,
            vec![rate(Currency::Usd, Currency::Eur, dec!(0), date(2026, 1, 1))],
        );
        assert!(table
            .resolve(Currency::Usd, Currency::Eur, date(2026, 1, 15))
            .is_none());
    }

    fn currency_strategy() -> impl Strategy<Value = Currency> {
        prop::sample::select(vec![
            Currency::Usd,
            Currency::Eur,
            Currency::Gbp,
            Currency::Cny,
            Currency::Brl,
        ])
    }

    fn rate_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..100_000i64).prop_map(|n| Decimal::new(n, 4))
    }

    proptest! {
        /// A stored direct rate from the base always wins over a stored
        /// inverse row for the same pair.
        #[test]
        fn prop_direct_beats_inverse(
            to in currency_strategy(),
            direct in rate_strategy(),
            inverse in rate_strategy(),
        ) {
            prop_assume!(to != Currency::Usd);

            let table = RateTable::new(
                Currency::Usd,
                vec![
                    rate(Currency::Usd, to, direct, date(2026, 1, 1)),
                    rate(to, Currency::Usd, inverse, date(2026, 1, 1)),
                ],
            );

            let resolved = table.resolve(Currency::Usd, to, date(2026, 1, 1)).unwrap();
            prop_assert_eq!(resolved.method, RateLookupMethod::Direct);
            prop_assert_eq!(resolved.rate, direct);
        }

        /// Resolving a pair and its reverse yields reciprocal rates.
        #[test]
        fn prop_reverse_is_reciprocal(
            to in currency_strategy(),
            stored in rate_strategy(),
        ) {
            prop_assume!(to != Currency::Usd);

            let table = RateTable::new(
                Currency::Usd,
                vec![rate(Currency::Usd, to, stored, date(2026, 1, 1))],
            );

            let forward = table.resolve(Currency::Usd, to, date(2026, 1, 1)).unwrap();
            let reverse = table.resolve(to, Currency::Usd, date(2026, 1, 1)).unwrap();
            prop_assert_eq!(reverse.rate, Decimal::ONE / forward.rate);
        }
    }
}
