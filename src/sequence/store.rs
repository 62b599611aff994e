use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use std::time::Duration;

use crate::database::Database;
use crate::models::SequenceCounter;

use super::error::StoreError;

/// Persistent home of the per-kind counters.
///
/// Implementations must make `increment` a single indivisible
/// read-modify-return: two concurrent calls for the same kind never see the
/// same result. A call that returns an error must not have changed the
/// counter.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Adds one to the counter for `kind` and returns the new value, or
    /// `None` when no counter exists for `kind` yet.
    async fn increment(&self, kind: &str) -> Result<Option<i64>, StoreError>;

    /// Creates the counter for `kind` at zero. Fails with
    /// [`StoreError::AlreadyExists`] when it is already there.
    async fn create(&self, kind: &str, prefix: &str, width: usize) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<SequenceCounter>, StoreError>;
}

#[derive(Clone)]
pub struct PgCounterStore {
    db: Database,
    statement_timeout: Duration,
}

impl PgCounterStore {
    pub fn new(db: Database, statement_timeout: Duration) -> Self {
        Self {
            db,
            statement_timeout,
        }
    }

    /// Opens a transaction whose statements Postgres cancels after
    /// `statement_timeout`. A cancelled statement is rolled back, so a slow
    /// increment either commits and is returned or never happens.
    async fn begin(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        let mut tx = self.db.begin().await?;
        sqlx::query("SELECT set_config('statement_timeout', $1, true)")
            .bind(statement_timeout_setting(self.statement_timeout))
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}

fn statement_timeout_setting(timeout: Duration) -> String {
    // 0 disables the timeout in Postgres
    format!("{}ms", timeout.as_millis().max(1))
}

#[async_trait]
impl CounterStore for PgCounterStore {
    async fn increment(&self, kind: &str) -> Result<Option<i64>, StoreError> {
        let mut tx = self.begin().await?;
        let value = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE sequence_counters
            SET last_value = last_value + 1,
                updated_at = NOW()
            WHERE entity_kind = $1
            RETURNING last_value
            "#,
        )
        .bind(kind)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(value)
    }

    async fn create(&self, kind: &str, prefix: &str, width: usize) -> Result<(), StoreError> {
        let width = i32::try_from(width)
            .map_err(|_| StoreError::Backend(format!("padding width {} out of range", width)))?;

        let mut tx = self.begin().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO sequence_counters (entity_kind, prefix, padding_width, last_value)
            VALUES ($1, $2, $3, 0)
            ON CONFLICT (entity_kind) DO NOTHING
            "#,
        )
        .bind(kind)
        .bind(prefix)
        .bind(width)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists);
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SequenceCounter>, StoreError> {
        let counters = sqlx::query_as::<_, SequenceCounter>(
            "SELECT * FROM sequence_counters ORDER BY entity_kind",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(counters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_timeout_is_rendered_in_milliseconds() {
        assert_eq!(statement_timeout_setting(Duration::from_secs(5)), "5000ms");
        assert_eq!(statement_timeout_setting(Duration::from_millis(250)), "250ms");
    }

    #[test]
    fn zero_timeout_does_not_disable_the_limit() {
        assert_eq!(statement_timeout_setting(Duration::ZERO), "1ms");
    }
}
