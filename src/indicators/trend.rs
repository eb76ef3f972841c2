use super::{
    ma,
    window::{self, Column},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub macd: Column,
    pub signal: Column,
    pub diff: Column,
}

/// MACD line `EMA(fast) - EMA(slow)`, its EMA signal line and the histogram.
pub fn macd(close: &[Option<f64>], fast: usize, slow: usize, signal: usize) -> Macd {
    let ema_fast = ma::exponential_moving_average(close, fast);
    let ema_slow = ma::exponential_moving_average(close, slow);
    let macd = window::zip_with(&ema_fast, &ema_slow, |f, s| f - s);
    let signal = ma::exponential_moving_average(&macd, signal);
    let diff = window::zip_with(&macd, &signal, |m, s| m - s);
    Macd { macd, signal, diff }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ichimoku {
    pub conversion: Column,
    pub base: Column,
    pub span_a: Column,
    pub span_b: Column,
}

/// Ichimoku lines without forward displacement.
pub fn ichimoku(
    high: &[f64],
    low: &[f64],
    conversion: usize,
    base: usize,
    span_b: usize,
) -> Ichimoku {
    let high = window::defined(high);
    let low = window::defined(low);
    let conversion = midpoint(&high, &low, conversion);
    let base = midpoint(&high, &low, base);
    let span_a = window::zip_with(&conversion, &base, |c, b| (c + b) / 2.0);
    let span_b = midpoint(&high, &low, span_b);
    Ichimoku {
        conversion,
        base,
        span_a,
        span_b,
    }
}

// Middle of the highest high and lowest low over the window.
fn midpoint(high: &[Option<f64>], low: &[Option<f64>], period: usize) -> Column {
    let highest = window::rolling(high, period, window::max);
    let lowest = window::rolling(low, period, window::min);
    window::zip_with(&highest, &lowest, |h, l| (h + l) / 2.0)
}
