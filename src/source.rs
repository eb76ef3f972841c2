use chrono::NaiveDate;
use thiserror::Error;

use crate::{http::client::RequestError, model};

/// Failure to obtain candles or symbols from the market-data provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// A single kline row that does not have the expected shape.
#[derive(Error, Debug, PartialEq)]
#[error("malformed candle at row {row}: {reason}")]
pub struct MalformedCandle {
    pub row: usize,
    pub reason: String,
}

/// Capability to pull raw candles and the list of tradable symbols.
#[allow(async_fn_in_trait)]
pub trait CandleSource {
    /// Every returned candle carries `fetched_at_ms` as its provenance stamp.
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        since: NaiveDate,
        fetched_at_ms: i64,
    ) -> Result<Vec<model::Candle>, ProviderError>;

    async fn list_tradable_symbols(&self, quote_suffix: &str)
    -> Result<Vec<String>, ProviderError>;
}
