use super::super::model::{self, SyncError};
use crate::constants;
use rusqlite::{Connection, OptionalExtension, params};

/// Name of the advisory lock table. Never a valid symbol, so it cannot
/// collide with a series table.
const LOCK_TABLE: &str = "_sync_lock";

/// Persistence of whole series, keyed by symbol.
pub trait SeriesStore {
    fn exists(&self, symbol: &str) -> model::Result<bool>;
    fn load(&self, symbol: &str) -> model::Result<model::Series>;
    /// Replaces the stored series as a whole.
    fn save(&mut self, series: &model::Series) -> model::Result<()>;
    fn list_symbols(&self) -> model::Result<Vec<String>>;
    /// Takes the store-wide sync lock for `owner`.
    fn try_lock(&mut self, owner: &str, now_ms: i64) -> model::Result<()>;
    fn unlock(&mut self, owner: &str) -> model::Result<()>;
}

/// Symbols become table names, so only ASCII letters and digits pass.
pub fn validate_symbol(symbol: &str) -> model::Result<&str> {
    if !symbol.is_empty() && symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(symbol)
    } else {
        Err(SyncError::InvalidSymbol(symbol.into()))
    }
}

/// One table per symbol, rows keyed by open time.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> model::Result<Self> {
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS \"{LOCK_TABLE}\" (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    owner TEXT NOT NULL,
                    acquired_at_ms INTEGER NOT NULL
                );"
            ),
            [],
        )?;
        Ok(Self { conn })
    }
}

impl SeriesStore for SqliteStore {
    fn exists(&self, symbol: &str) -> model::Result<bool> {
        let symbol = validate_symbol(symbol)?;
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [symbol],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn load(&self, symbol: &str) -> model::Result<model::Series> {
        if !self.exists(symbol)? {
            return Err(SyncError::SeriesNotFound(symbol.into()));
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT open_time_ms, open, high, low, close, query_time_ms
             FROM \"{symbol}\" ORDER BY open_time_ms ASC"
        ))?;
        let candles = stmt
            .query_map([], |row| {
                Ok(model::Candle {
                    open_time_ms: row.get(0)?,
                    open: row.get(1)?,
                    high: row.get(2)?,
                    low: row.get(3)?,
                    close: row.get(4)?,
                    fetched_at_ms: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(model::Series::new(symbol, candles))
    }

    fn save(&mut self, series: &model::Series) -> model::Result<()> {
        let symbol = validate_symbol(&series.symbol)?;
        let transaction = self.conn.transaction()?;
        transaction.execute(&format!("DROP TABLE IF EXISTS \"{symbol}\""), [])?;
        transaction.execute(
            &format!(
                "CREATE TABLE \"{symbol}\" (
                    open_time TEXT NOT NULL,
                    open REAL NOT NULL,
                    high REAL NOT NULL,
                    low REAL NOT NULL,
                    close REAL NOT NULL,
                    open_time_ms INTEGER PRIMARY KEY,
                    query_time_ms INTEGER NOT NULL
                );"
            ),
            [],
        )?;
        {
            let mut stmt = transaction.prepare(&format!(
                "INSERT INTO \"{symbol}\" (open_time, open, high, low, close, open_time_ms, query_time_ms)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
            ))?;
            for candle in &series.candles {
                let open_time = candle
                    .open_time()
                    .map(|t| t.format(model::OPEN_TIME_FORMAT).to_string())
                    .unwrap_or_default();
                stmt.execute(params![
                    open_time,
                    candle.open,
                    candle.high,
                    candle.low,
                    candle.close,
                    candle.open_time_ms,
                    candle.fetched_at_ms,
                ])?;
            }
        }
        transaction.commit()?;
        Ok(())
    }

    fn list_symbols(&self) -> model::Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names
            .into_iter()
            .filter(|name| validate_symbol(name).is_ok())
            .collect())
    }

    fn try_lock(&mut self, owner: &str, now_ms: i64) -> model::Result<()> {
        let transaction = self.conn.transaction()?;
        let held: Option<(String, i64)> = transaction
            .query_row(
                &format!("SELECT owner, acquired_at_ms FROM \"{LOCK_TABLE}\" WHERE id = 1"),
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        if let Some((holder, acquired_at_ms)) = held {
            if now_ms - acquired_at_ms < constants::STALE_LOCK_MS {
                return Err(SyncError::StoreLocked(holder));
            }
            log::warn!("taking over stale sync lock held by {holder} since {acquired_at_ms}");
        }

        transaction.execute(
            &format!(
                "REPLACE INTO \"{LOCK_TABLE}\" (id, owner, acquired_at_ms) VALUES (1, ?1, ?2)"
            ),
            params![owner, now_ms],
        )?;
        transaction.commit()?;
        Ok(())
    }

    fn unlock(&mut self, owner: &str) -> model::Result<()> {
        self.conn.execute(
            &format!("DELETE FROM \"{LOCK_TABLE}\" WHERE id = 1 AND owner = ?1"),
            [owner],
        )?;
        Ok(())
    }
}
