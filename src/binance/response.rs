use serde::Deserialize;
use serde_json::Value;

use crate::{model, source::MalformedCandle};

/// Status of a symbol that currently accepts orders.
const TRADING: &str = "TRADING";

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfo {
    pub symbols: Vec<SymbolInfo>,
}

impl ExchangeInfo {
    /// Symbols that are trading and quoted in `quote_suffix`, in exchange order.
    pub fn tradable_symbols(self, quote_suffix: &str) -> Vec<String> {
        self.symbols
            .into_iter()
            .filter(|s| s.status == TRADING && s.symbol.ends_with(quote_suffix))
            .map(|s| s.symbol)
            .collect()
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(default)]
    pub status: String,
}

/// One kline as sent by the exchange:
/// `[openTime, "open", "high", "low", "close", "volume", closeTime, ...]`.
pub type KlineRow = Vec<Value>;

/// Converts one kline row into a candle stamped with `fetched_at_ms`.
pub fn parse_kline(
    row_index: usize,
    row: &[Value],
    fetched_at_ms: i64,
) -> Result<model::Candle, MalformedCandle> {
    let malformed = |reason: String| MalformedCandle {
        row: row_index,
        reason,
    };

    if row.len() < 5 {
        return Err(malformed(format!("expected at least 5 fields, got {}", row.len())));
    }

    let open_time_ms = row[0]
        .as_i64()
        .ok_or_else(|| malformed(format!("open time is not an integer: {}", row[0])))?;

    let mut prices = [0.0f64; 4];
    for (slot, (value, name)) in prices
        .iter_mut()
        .zip(row[1..5].iter().zip(["open", "high", "low", "close"]))
    {
        *slot = price(value).ok_or_else(|| malformed(format!("{name} is not a number: {value}")))?;
    }
    let [open, high, low, close] = prices;

    Ok(model::Candle {
        open_time_ms,
        open,
        high,
        low,
        close,
        fetched_at_ms,
    })
}

// Prices come as decimal strings, but plain numbers are accepted as well.
fn price(value: &Value) -> Option<f64> {
    let v = match value {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}
