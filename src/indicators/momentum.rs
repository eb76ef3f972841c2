use super::{
    ma,
    window::{self, Column},
};

/// Relative strength index with Wilder smoothing (`alpha = 1/period`).
///
/// The first sample has no previous close and counts as a zero gain and a
/// zero loss, so the first defined value is at index `period - 1`. A window
/// without losses reads 100.
pub fn rsi(close: &[f64], period: usize) -> Column {
    let mut gains: Column = vec![Some(0.0); close.len()];
    let mut losses: Column = vec![Some(0.0); close.len()];
    for i in 1..close.len() {
        let change = close[i] - close[i - 1];
        gains[i] = Some(change.max(0.0));
        losses[i] = Some((-change).max(0.0));
    }

    let alpha = 1.0 / period as f64;
    let avg_gain = window::ewm(&gains, alpha, period);
    let avg_loss = window::ewm(&losses, alpha, period);
    window::zip_with(&avg_gain, &avg_loss, |gain, loss| {
        if loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + gain / loss)
        }
    })
}

/// Stochastic RSI and its smoothed `%K` / `%D` lines, all in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StochRsi {
    pub stochrsi: Column,
    pub k: Column,
    pub d: Column,
}

pub fn stoch_rsi(close: &[f64], period: usize, smooth_k: usize, smooth_d: usize) -> StochRsi {
    let rsi = rsi(close, period);
    let lowest = window::rolling(&rsi, period, window::min);
    let highest = window::rolling(&rsi, period, window::max);

    let stochrsi: Column = rsi
        .iter()
        .zip(lowest.iter().zip(&highest))
        .map(|(value, (lo, hi))| {
            let (value, lo, hi) = ((*value)?, (*lo)?, (*hi)?);
            // A flat RSI window has no range to normalize against.
            (hi > lo).then(|| (value - lo) / (hi - lo))
        })
        .collect();

    let k = ma::sma(&stochrsi, smooth_k);
    let d = ma::sma(&k, smooth_d);
    StochRsi { stochrsi, k, d }
}
