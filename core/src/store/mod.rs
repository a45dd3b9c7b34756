//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the generated database.
//! Phases call store methods and never execute SQL directly.

use crate::{
    error::GenResult,
    types::{parse_day, Day},
};
use rusqlite::{types::Type, Connection};
use std::path::{Path, PathBuf};

mod breakdown;
mod daily;
mod funnel;
mod ticket;

pub use ticket::MonthlyShare;

/// Every table the generator writes, in creation order.
pub const TABLES: [&str; 5] = [
    "daily_metrics",
    "channel_metrics",
    "product_metrics",
    "support_tickets",
    "weekly_funnel",
];

pub struct MetricsStore {
    conn: Connection,
    path: Option<PathBuf>, // None for :memory:
}

impl MetricsStore {
    pub fn open(path: &Path) -> GenResult<Self> {
        let conn = Connection::open(path)?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Delete any existing database at `path` and open a fresh one.
    /// Prior contents are always discarded; there is no incremental append.
    pub fn recreate(path: &Path) -> GenResult<Self> {
        if path.exists() {
            log::info!("Removing existing database {}", path.display());
            std::fs::remove_file(path)?;
        }
        Self::open(path)
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GenResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Drop and recreate all five tables.
    pub fn migrate(&self) -> GenResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_metrics_schema.sql"))?;
        Ok(())
    }

    /// Run `f` inside a single transaction, committing only if it succeeds.
    pub fn in_transaction<T>(&self, f: impl FnOnce(&Self) -> GenResult<T>) -> GenResult<T> {
        let tx = self.conn.unchecked_transaction()?;
        let out = f(self)?;
        tx.commit()?;
        Ok(out)
    }

    pub fn table_row_count(&self, table: &str) -> GenResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", table.replace('"', "\"\""));
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    /// Row count of each generator table, in creation order.
    pub fn table_counts(&self) -> GenResult<Vec<(String, i64)>> {
        TABLES
            .iter()
            .map(|t| Ok((t.to_string(), self.table_row_count(t)?)))
            .collect()
    }
}

/// Read a `YYYY-MM-DD` text column as a date.
pub(crate) fn day_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Day> {
    let text: String = row.get(idx)?;
    parse_day(&text).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
