use super::response;
use crate::{
    constants,
    http::client::{self, RequestError},
    model,
    source::{CandleSource, ProviderError},
};
use chrono::NaiveDate;
use std::collections::HashMap;
use url::Url;

/// Binance spot REST market-data source.
pub struct BinanceSource {
    base_url: Url,
    api_key: Option<String>,
}

impl BinanceSource {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, ProviderError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| RequestError::Other(format!("invalid base url {base_url}: {e}")))?;
        Ok(Self { base_url, api_key })
    }

    fn endpoint(&self, path: &str) -> Result<String, ProviderError> {
        self.base_url
            .join(path)
            .map(|u| u.to_string())
            .map_err(|e| RequestError::Other(e.to_string()).into())
    }

    fn headers(&self) -> HashMap<&str, &str> {
        match &self.api_key {
            Some(key) => HashMap::from([("X-MBX-APIKEY", key.as_str())]),
            None => HashMap::new(),
        }
    }

    /// Fetches one page of klines starting at `start_ms`.
    async fn klines_page(
        &self,
        symbol: &str,
        interval: &str,
        start_ms: i64,
    ) -> Result<Vec<response::KlineRow>, ProviderError> {
        let start = start_ms.to_string();
        let limit = constants::KLINES_PAGE_LIMIT.to_string();
        let rows = client::get::<Vec<response::KlineRow>>(
            &self.endpoint("/api/v3/klines")?,
            HashMap::from([
                ("symbol", symbol),
                ("interval", interval),
                ("startTime", start.as_str()),
                ("limit", limit.as_str()),
            ]),
            self.headers(),
        )
        .await?;
        Ok(rows)
    }
}

impl CandleSource for BinanceSource {
    /// Pages through klines from midnight UTC of `since` up to now.
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        since: NaiveDate,
        fetched_at_ms: i64,
    ) -> Result<Vec<model::Candle>, ProviderError> {
        let mut start_ms = since
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .ok_or_else(|| ProviderError::MalformedPayload(format!("invalid date {since}")))?;

        let mut candles = Vec::new();
        loop {
            let rows = self.klines_page(symbol, interval, start_ms).await?;
            let page_len = rows.len();
            let (parsed, dropped) = collect_candles(&rows, fetched_at_ms);
            if dropped > 0 {
                log::warn!("{symbol}: dropped {dropped} malformed kline rows");
            }

            candles.extend(parsed);

            let last_open = rows
                .last()
                .and_then(|row| row.first())
                .and_then(|v| v.as_i64());
            match last_open {
                Some(t) if page_len >= constants::KLINES_PAGE_LIMIT && t >= start_ms => {
                    start_ms = t + 1
                }
                _ => break,
            }
        }

        log::debug!("{symbol}: fetched {} candles since {since}", candles.len());
        Ok(candles)
    }

    async fn list_tradable_symbols(
        &self,
        quote_suffix: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let info = client::get::<response::ExchangeInfo>(
            &self.endpoint("/api/v3/exchangeInfo")?,
            HashMap::new(),
            self.headers(),
        )
        .await?;

        Ok(info.tradable_symbols(quote_suffix))
    }
}

/// Parses every row, dropping the malformed ones. Returns the candles and the
/// number of dropped rows.
pub fn collect_candles(
    rows: &[response::KlineRow],
    fetched_at_ms: i64,
) -> (Vec<model::Candle>, usize) {
    let mut dropped = 0;
    let mut candles = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        match response::parse_kline(i, row, fetched_at_ms) {
            Ok(candle) => {
                if !candle.is_consistent() {
                    log::debug!("suspect candle at {}: {:?}", candle.open_time_ms, candle);
                }
                candles.push(candle);
            }
            Err(e) => {
                log::warn!("{e}");
                dropped += 1;
            }
        }
    }
    (candles, dropped)
}
