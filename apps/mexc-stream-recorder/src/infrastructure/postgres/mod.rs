//! Postgres Sink Adapter
//!
//! Connection-pooled store for the symbol catalog and deal rows. All stream
//! tasks share one pool; concurrent single-row inserts are serialized by the
//! database, with no application-level locking.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::application::ports::{DealSink, SinkError};
use crate::domain::deal::DealRecord;
use crate::infrastructure::config::DatabaseSettings;

/// Catalog upsert, idempotent on duplicate symbols.
const UPSERT_SYMBOL_SQL: &str =
    "INSERT INTO market.currencies(symbol) VALUES($1) ON CONFLICT (symbol) DO NOTHING";

/// Single-row deal insert.
const INSERT_DEAL_SQL: &str = "\
    INSERT INTO market.deals(fk_symbol, d_time, d_side, d_price, d_qty) \
    VALUES($1, $2, $3, $4, $5)";

/// Store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<sqlx::Error> for SinkError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e.to_string())
    }
}

/// Postgres-backed deal store shared by every stream task.
#[derive(Clone)]
pub struct PgDealStore {
    pool: PgPool,
}

impl PgDealStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool using the configured settings.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the pool cannot be established.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&settings.url)
            .await?;

        Ok(Self::new(pool))
    }

    /// Create the market schema and tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if any statement fails.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query("CREATE SCHEMA IF NOT EXISTS market")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS market.currencies (
                symbol TEXT PRIMARY KEY
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS market.deals (
                fk_symbol TEXT NOT NULL REFERENCES market.currencies(symbol),
                d_time TIMESTAMP NOT NULL,
                d_side TEXT NOT NULL,
                d_price NUMERIC(20, 8) NOT NULL,
                d_qty NUMERIC(20, 8) NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("market schema ready");
        Ok(())
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DealSink for PgDealStore {
    async fn upsert_symbol(&self, symbol: &str) -> Result<(), SinkError> {
        sqlx::query(UPSERT_SYMBOL_SQL)
            .bind(symbol)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn insert_deal(&self, deal: &DealRecord) -> Result<(), SinkError> {
        sqlx::query(INSERT_DEAL_SQL)
            .bind(&deal.symbol)
            .bind(deal.executed_at)
            .bind(deal.side.as_str())
            .bind(deal.price)
            .bind(deal.quantity)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_upsert_ignores_duplicates() {
        // Idempotence lives in the conflict clause; re-registering a symbol
        // must be a no-op rather than an error or a duplicate row.
        assert!(UPSERT_SYMBOL_SQL.contains("ON CONFLICT (symbol) DO NOTHING"));
    }

    #[test]
    fn deal_insert_binds_all_columns() {
        for column in ["fk_symbol", "d_time", "d_side", "d_price", "d_qty"] {
            assert!(INSERT_DEAL_SQL.contains(column), "missing column {column}");
        }
    }

    #[test]
    fn sink_error_carries_database_detail() {
        let e = SinkError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(e, SinkError::Database(_)));
        assert!(e.to_string().starts_with("database error:"));
    }
}
