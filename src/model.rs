use std::io;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::source::ProviderError;

/// Format used for the human readable `open_time` column.
pub const OPEN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Structure representing one OHLC sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub open_time_ms: i64,  // Interval open instant, epoch ms. Unique within a series.
    pub open: f64,          // Opening price.
    pub high: f64,          // Highest price.
    pub low: f64,           // Lowest price.
    pub close: f64,         // Closing price.
    pub fetched_at_ms: i64, // Time of the query that produced this row.
}

impl Candle {
    pub fn open_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.open_time_ms)
    }

    /// Midpoint of the high/low range.
    pub fn hl2(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// True when the high/low range encloses open and close.
    pub fn is_consistent(&self) -> bool {
        self.low <= self.open.min(self.close)
            && self.open.max(self.close) <= self.high
    }
}

/// Ordered, de-duplicated candles of one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub symbol: String,
    pub candles: Vec<Candle>,
}

impl Series {
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.into(),
            candles: Vec::new(),
        }
    }

    pub fn new(symbol: &str, candles: Vec<Candle>) -> Self {
        Self {
            symbol: symbol.into(),
            candles,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Strictly ascending by open time, hence no duplicates either.
    pub fn is_canonical(&self) -> bool {
        self.candles
            .windows(2)
            .all(|w| w[0].open_time_ms < w[1].open_time_ms)
    }

    /// Keeps only the most recent `count` candles.
    pub fn tail(mut self, count: usize) -> Self {
        if self.candles.len() > count {
            self.candles.drain(..self.candles.len() - count);
        }
        self
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("io error: {0}")]
    CouldNotOpenFile(#[from] io::Error),
    #[error("could not read line from symbols file")]
    CouldNotReadLine,
    #[error("empty symbols file: {0}")]
    EmptySymbolFile(String),
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("invalid symbol {0:?}: only ASCII letters and digits are allowed")]
    InvalidSymbol(String),
    #[error("no stored series for {0}")]
    SeriesNotFound(String),
    #[error("store is locked by {0}")]
    StoreLocked(String),
    #[error("csv error: {0}")]
    CsvError(#[from] csv::Error),
}
