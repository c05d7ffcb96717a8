//! SQLite price store adapter.

use crate::domain::error::SentinelError;
use crate::domain::money::parse_decimal;
use crate::domain::price::PriceBar;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, params};
use rust_decimal::Decimal;
use std::path::Path;
use tracing::debug;

pub struct SqlitePriceAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqlitePriceAdapter {
    /// Opens the store named by `[sqlite] path`; a relative path is taken
    /// from `base_dir`.
    pub fn from_config(config: &dyn ConfigPort, base_dir: &Path) -> Result<Self, SentinelError> {
        let raw_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| SentinelError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;
        let db_path = base_dir.join(raw_path.trim());

        let pool_size = config.get_int("sqlite", "pool_size", 4).max(1) as u32;
        debug!(path = %db_path.display(), pool_size, "opening sqlite price store");

        let manager = SqliteConnectionManager::file(&db_path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| SentinelError::Database {
                    reason: e.to_string(),
                })?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, SentinelError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| SentinelError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, SentinelError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| SentinelError::Database {
                reason: e.to_string(),
            })
    }

    pub fn initialize_schema(&self) -> Result<(), SentinelError> {
        let conn = self.conn()?;

        // close is stored as text so decimal prices survive unchanged
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS prices (
                ticker TEXT NOT NULL,
                date TEXT NOT NULL,
                close TEXT NOT NULL,
                PRIMARY KEY (ticker, date)
            );
            CREATE INDEX IF NOT EXISTS idx_prices_ticker ON prices(ticker);",
        )
        .map_err(|e: rusqlite::Error| SentinelError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    pub fn insert_bars(&self, ticker: &str, bars: &[PriceBar]) -> Result<(), SentinelError> {
        let mut conn = self.conn()?;

        let tx =
            conn.transaction()
                .map_err(|e: rusqlite::Error| SentinelError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        for bar in bars {
            tx.execute(
                "INSERT OR REPLACE INTO prices (ticker, date, close) VALUES (?1, ?2, ?3)",
                params![
                    ticker,
                    bar.date.format("%Y-%m-%d").to_string(),
                    bar.close.to_string()
                ],
            )
            .map_err(|e: rusqlite::Error| SentinelError::DatabaseQuery {
                reason: e.to_string(),
            })?;
        }

        tx.commit()
            .map_err(|e: rusqlite::Error| SentinelError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(())
    }

    fn parse_row(ticker: &str, date_str: &str, close_str: &str) -> Result<PriceBar, SentinelError> {
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
            SentinelError::PriceData {
                ticker: ticker.to_string(),
                reason: format!("invalid date {:?}: {}", date_str, e),
            }
        })?;
        let close = parse_decimal(close_str).ok_or_else(|| SentinelError::PriceData {
            ticker: ticker.to_string(),
            reason: format!("invalid close value {:?}", close_str),
        })?;
        Ok(PriceBar { date, close })
    }
}

impl PricePort for SqlitePriceAdapter {
    fn latest_price(&self, ticker: &str) -> Result<Option<Decimal>, SentinelError> {
        let conn = self.conn()?;

        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT date, close FROM prices WHERE ticker = ?1 ORDER BY date DESC LIMIT 1",
                params![ticker],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e: rusqlite::Error| SentinelError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        match row {
            Some((date, close)) => Ok(Some(Self::parse_row(ticker, &date, &close)?.close)),
            None => Ok(None),
        }
    }

    fn price_history(&self, ticker: &str, bars: usize) -> Result<Vec<PriceBar>, SentinelError> {
        let conn = self.conn()?;

        let query = "SELECT date, close FROM prices
                     WHERE ticker = ?1
                     ORDER BY date DESC
                     LIMIT ?2";

        let mut stmt =
            conn.prepare(query)
                .map_err(|e: rusqlite::Error| SentinelError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        let rows = stmt
            .query_map(params![ticker, bars as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e: rusqlite::Error| SentinelError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut history = Vec::new();
        for row in rows {
            let (date, close) = row.map_err(|e: rusqlite::Error| SentinelError::DatabaseQuery {
                reason: e.to_string(),
            })?;
            history.push(Self::parse_row(ticker, &date, &close)?);
        }

        history.reverse();
        Ok(history)
    }
}
