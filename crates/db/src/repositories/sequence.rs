//! Reference sequence repository.
//!
//! Issues gapless per (kind, year) reference numbers under a row lock.
//! Two concurrent first-time callers can race on the insert; the unique
//! constraint on (kind, year) turns the loser into a retry.

use chrono::{Datelike, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::warn;
use uuid::Uuid;

use tradewind_core::reference::ReferenceKind;

use crate::entities::reference_sequences;
use crate::entities::sea_orm_active_enums::ReferenceKind as DbReferenceKind;

/// Error types for sequence operations.
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    /// Retries exhausted on a contended counter row.
    #[error("Reference sequence for {kind} {year} is contended, retry later")]
    Contention {
        /// The contended kind.
        kind: ReferenceKind,
        /// The contended year.
        year: i32,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Reference sequence repository.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    db: DatabaseConnection,
    max_retries: u32,
}

impl SequenceRepository {
    /// Creates a new sequence repository with the default retry budget.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db, max_retries: 3 }
    }

    /// Creates a repository with an explicit retry budget.
    #[must_use]
    pub const fn with_retries(db: DatabaseConnection, max_retries: u32) -> Self {
        Self { db, max_retries }
    }

    /// Issues the next reference for (kind, year).
    ///
    /// Locks (or creates) the counter row inside one transaction, so
    /// concurrent callers serialize and no number is issued twice. The
    /// year defaults to the current calendar year.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::Contention`] when insert races exhaust
    /// the retry budget.
    pub async fn next_reference(
        &self,
        kind: ReferenceKind,
        year: Option<i32>,
    ) -> Result<String, SequenceError> {
        let year = year.unwrap_or_else(|| Utc::now().year());

        for attempt in 0..=self.max_retries {
            match self.try_next(kind, year).await {
                Ok(number) => return Ok(kind.format(year, number)),
                Err(SequenceError::Contention { .. }) if attempt < self.max_retries => {
                    warn!(kind = %kind, year, attempt, "sequence insert race, retrying");
                    tokio::time::sleep(std::time::Duration::from_millis(
                        10 * u64::from(attempt + 1),
                    ))
                    .await;
                }
                Err(e) => return Err(e),
            }
        }

        Err(SequenceError::Contention { kind, year })
    }

    /// Reads the number the next call would issue, without reserving it.
    ///
    /// Not reservation-safe: a concurrent `next_reference` can take the
    /// previewed number. For UI display only.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn preview_reference(
        &self,
        kind: ReferenceKind,
        year: Option<i32>,
    ) -> Result<String, SequenceError> {
        let year = year.unwrap_or_else(|| Utc::now().year());

        let next_number = reference_sequences::Entity::find()
            .filter(reference_sequences::Column::Kind.eq(DbReferenceKind::from(kind)))
            .filter(reference_sequences::Column::Year.eq(year))
            .one(&self.db)
            .await?
            .map_or(1, |row| row.next_number);

        Ok(kind.format(year, next_number))
    }

    /// One locked increment attempt. Returns the issued number.
    async fn try_next(&self, kind: ReferenceKind, year: i32) -> Result<i64, SequenceError> {
        let txn = self.db.begin().await?;

        let existing = reference_sequences::Entity::find()
            .filter(reference_sequences::Column::Kind.eq(DbReferenceKind::from(kind)))
            .filter(reference_sequences::Column::Year.eq(year))
            .lock_exclusive()
            .one(&txn)
            .await?;

        let number = if let Some(row) = existing {
            let number = row.next_number;
            let mut active: reference_sequences::ActiveModel = row.into();
            active.next_number = Set(number + 1);
            active.update(&txn).await?;
            number
        } else {
            // First reference of the (kind, year): issue 1, store 2.
            let insert = reference_sequences::ActiveModel {
                id: Set(Uuid::now_v7()),
                kind: Set(DbReferenceKind::from(kind)),
                year: Set(year),
                next_number: Set(2),
            }
            .insert(&txn)
            .await;

            match insert {
                Ok(_) => 1,
                Err(e) => {
                    return match e.sql_err() {
                        Some(SqlErr::UniqueConstraintViolation(_)) => {
                            Err(SequenceError::Contention { kind, year })
                        }
                        _ => Err(SequenceError::Database(e)),
                    };
                }
            }
        };

        txn.commit().await?;
        Ok(number)
    }
}
