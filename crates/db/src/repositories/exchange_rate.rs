//! Exchange rate repository.
//!
//! Persists manually-entered and feed-ingested rates as pending/approved
//! records and materializes the approved set into the core [`RateTable`]
//! for conversion.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use tradewind_core::currency::{RateTable, ResolvedRate, StoredRate};
use tradewind_shared::types::Currency;

use crate::entities::exchange_rates;
use crate::entities::sea_orm_active_enums::{RateSource, RateStatus};

/// Error types for exchange rate operations.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeRateError {
    /// Rate must be positive.
    #[error("Exchange rate must be positive")]
    NonPositiveRate,

    /// Currencies must be different.
    #[error("From and to currencies must be different")]
    SameCurrency,

    /// Currency code is not supported.
    #[error("Unknown currency '{0}'")]
    UnknownCurrency(String),

    /// Exchange rate record not found.
    #[error("Exchange rate {0} not found")]
    RateNotFound(Uuid),

    /// No rate resolvable for the pair.
    #[error("No approved exchange rate for {0}/{1} on or before {2}")]
    RateUnavailable(Currency, Currency, NaiveDate),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for recording an exchange rate.
#[derive(Debug, Clone)]
pub struct CreateExchangeRateInput {
    /// Source currency code.
    pub from_currency: Currency,
    /// Target currency code.
    pub to_currency: Currency,
    /// Exchange rate (from_currency * rate = to_currency).
    pub rate: Decimal,
    /// Effective date for this rate.
    pub effective_date: NaiveDate,
    /// Where the rate came from.
    pub source: RateSource,
    /// Whether the rate is immediately approved (manual entry) or
    /// pending review (feed ingest).
    pub status: RateStatus,
    /// Optional reference (e.g., feed provider).
    pub source_reference: Option<String>,
    /// Who recorded the rate.
    pub created_by: Option<Uuid>,
}

/// Exchange rate repository.
#[derive(Debug, Clone)]
pub struct ExchangeRateRepository {
    db: DatabaseConnection,
    base_currency: Currency,
}

impl ExchangeRateRepository {
    /// Creates a new exchange rate repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, base_currency: Currency) -> Self {
        Self { db, base_currency }
    }

    /// Creates or updates the rate for (pair, effective date).
    ///
    /// # Errors
    ///
    /// Returns an error if the rate is not positive or the currencies
    /// are equal.
    pub async fn upsert_rate(
        &self,
        input: CreateExchangeRateInput,
    ) -> Result<exchange_rates::Model, ExchangeRateError> {
        if input.rate <= Decimal::ZERO {
            return Err(ExchangeRateError::NonPositiveRate);
        }
        if input.from_currency == input.to_currency {
            return Err(ExchangeRateError::SameCurrency);
        }

        let existing = exchange_rates::Entity::find()
            .filter(exchange_rates::Column::FromCurrency.eq(input.from_currency.as_str()))
            .filter(exchange_rates::Column::ToCurrency.eq(input.to_currency.as_str()))
            .filter(exchange_rates::Column::EffectiveDate.eq(input.effective_date))
            .one(&self.db)
            .await?;

        if let Some(existing_rate) = existing {
            let mut active: exchange_rates::ActiveModel = existing_rate.into();
            active.rate = Set(input.rate);
            active.status = Set(input.status);
            active.source = Set(input.source);
            active.source_reference = Set(input.source_reference);
            if input.created_by.is_some() {
                active.created_by = Set(input.created_by);
            }
            Ok(active.update(&self.db).await?)
        } else {
            let row = exchange_rates::ActiveModel {
                id: Set(Uuid::now_v7()),
                from_currency: Set(input.from_currency.as_str().to_string()),
                to_currency: Set(input.to_currency.as_str().to_string()),
                rate: Set(input.rate),
                effective_date: Set(input.effective_date),
                status: Set(input.status),
                source: Set(input.source),
                source_reference: Set(input.source_reference),
                created_by: Set(input.created_by),
                created_at: Set(chrono::Utc::now().into()),
            };
            Ok(row.insert(&self.db).await?)
        }
    }

    /// Approves a pending rate, making it visible to conversion.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate does not exist.
    pub async fn approve_rate(
        &self,
        rate_id: Uuid,
        approved_by: Option<Uuid>,
    ) -> Result<exchange_rates::Model, ExchangeRateError> {
        let rate = exchange_rates::Entity::find_by_id(rate_id)
            .one(&self.db)
            .await?
            .ok_or(ExchangeRateError::RateNotFound(rate_id))?;

        let mut active: exchange_rates::ActiveModel = rate.into();
        active.status = Set(RateStatus::Approved);
        if approved_by.is_some() {
            active.created_by = Set(approved_by);
        }
        Ok(active.update(&self.db).await?)
    }

    /// Resolves a rate for the pair as of the date.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeRateError::RateUnavailable`] when no approved
    /// rate chain exists - the caller decides the fallback policy.
    pub async fn find_rate(
        &self,
        from: Currency,
        to: Currency,
        as_of: NaiveDate,
    ) -> Result<ResolvedRate, ExchangeRateError> {
        let table = load_rate_table(&self.db, self.base_currency).await?;
        table
            .resolve(from, to, as_of)
            .ok_or(ExchangeRateError::RateUnavailable(from, to, as_of))
    }

    /// Lists all stored rates, newest effective date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_rates(&self) -> Result<Vec<exchange_rates::Model>, ExchangeRateError> {
        Ok(exchange_rates::Entity::find()
            .order_by_desc(exchange_rates::Column::EffectiveDate)
            .order_by_asc(exchange_rates::Column::FromCurrency)
            .order_by_asc(exchange_rates::Column::ToCurrency)
            .all(&self.db)
            .await?)
    }

    /// Materializes the approved rate set for the core engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn load_table(&self) -> Result<RateTable, ExchangeRateError> {
        Ok(load_rate_table(&self.db, self.base_currency).await?)
    }
}

/// Loads all approved rates into a [`RateTable`].
///
/// Rows with unsupported currency codes are skipped: they can never
/// participate in a conversion between supported currencies.
pub(crate) async fn load_rate_table<C: ConnectionTrait>(
    conn: &C,
    base_currency: Currency,
) -> Result<RateTable, DbErr> {
    let rows = exchange_rates::Entity::find()
        .filter(exchange_rates::Column::Status.eq(RateStatus::Approved))
        .all(conn)
        .await?;

    let rates = rows
        .into_iter()
        .filter_map(|row| {
            let from = Currency::parse(&row.from_currency)?;
            let to = Currency::parse(&row.to_currency)?;
            Some(StoredRate {
                from,
                to,
                rate: row.rate,
                effective_date: row.effective_date,
            })
        })
        .collect();

    Ok(RateTable::new(base_currency, rates))
}
