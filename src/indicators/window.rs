//! Column helpers shared by the indicator transforms.
//!
//! A column holds one `Option<f64>` per candle; `None` marks a position
//! where the indicator is not defined (warm-up region).

pub type Column = Vec<Option<f64>>;

/// Lifts a raw price column into a fully defined indicator column.
pub fn defined(values: &[f64]) -> Column {
    values.iter().copied().map(Some).collect()
}

/// Applies `f` over each trailing window of `window` samples. A window that
/// contains an undefined sample yields `None`.
pub fn rolling<F>(values: &[Option<f64>], window: usize, f: F) -> Column
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    let mut buf = Vec::with_capacity(window);
    for end in window..=values.len() {
        buf.clear();
        buf.extend(values[end - window..end].iter().map_while(|v| *v));
        if buf.len() == window {
            out[end - 1] = Some(f(&buf));
        }
    }
    out
}

/// Recursive exponential smoothing (`adjust=False`). Seeds with the first
/// defined sample and reports a value once `min_periods` samples were seen.
pub fn ewm(values: &[Option<f64>], alpha: f64, min_periods: usize) -> Column {
    let mut out = vec![None; values.len()];
    if min_periods == 0 {
        return out;
    }

    let mut state: Option<f64> = None;
    let mut seen = 0;
    for (i, value) in values.iter().enumerate() {
        let Some(x) = *value else { continue };
        state = Some(match state {
            None => x,
            Some(prev) => alpha * x + (1.0 - alpha) * prev,
        });
        seen += 1;
        if seen >= min_periods {
            out[i] = state;
        }
    }
    out
}

/// Element-wise combination of two columns, undefined where either is.
pub fn zip_with<F>(a: &[Option<f64>], b: &[Option<f64>], f: F) -> Column
where
    F: Fn(f64, f64) -> f64,
{
    a.iter()
        .zip(b)
        .map(|(x, y)| Some(f((*x)?, (*y)?)))
        .collect()
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (ddof = 0).
pub fn std_pop(values: &[f64]) -> f64 {
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}
