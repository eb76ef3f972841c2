use super::window::{self, Column};

/// True range per sample. The first sample has no previous close and uses
/// its high-low range.
pub fn true_ranges(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    (0..n)
        .map(|i| match i {
            0 => high[0] - low[0],
            _ => true_range(high[i], low[i], close[i - 1]),
        })
        .collect()
}

fn true_range(high: f64, low: f64, previous_close: f64) -> f64 {
    let a = high - low;
    let b = (high - previous_close).abs();
    let c = (low - previous_close).abs();

    // find the max value of a, b, and c
    a.max(b).max(c)
}

/// Average true range with Wilder smoothing. The first value is the plain
/// mean of the first `period` true ranges.
pub fn average_true_range(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Column {
    let trs = true_ranges(high, low, close);
    let mut out = vec![None; trs.len()];
    if period == 0 || trs.len() < period {
        return out;
    }

    let p = period as f64;
    let mut atr = trs[..period].iter().sum::<f64>() / p;
    out[period - 1] = Some(atr);
    for i in period..trs.len() {
        atr = (atr * (p - 1.0) + trs[i]) / p;
        out[i] = Some(atr);
    }
    out
}

/// Bollinger bands around a rolling mean.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub hband: Column,
    pub mband: Column,
    pub lband: Column,
}

pub fn bollinger(close: &[Option<f64>], period: usize, deviations: f64) -> BollingerBands {
    let mband = window::rolling(close, period, window::mean);
    let std = window::rolling(close, period, window::std_pop);
    BollingerBands {
        hband: window::zip_with(&mband, &std, |m, s| m + deviations * s),
        lband: window::zip_with(&mband, &std, |m, s| m - deviations * s),
        mband,
    }
}
