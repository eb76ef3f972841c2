use super::window::{self, Column};

/// Simple moving average over `period` samples.
pub fn sma(values: &[Option<f64>], period: usize) -> Column {
    window::rolling(values, period, window::mean)
}

/// Exponential moving average, `alpha = 2 / (period + 1)`.
pub fn exponential_moving_average(values: &[Option<f64>], period: usize) -> Column {
    let multiplier = 2.0 / (period as f64 + 1.0);
    window::ewm(values, multiplier, period)
}

/// Double exponential moving average: `2*EMA - EMA(EMA)`.
pub fn dema(values: &[Option<f64>], period: usize) -> Column {
    let ema = exponential_moving_average(values, period);
    let ema_of_ema = exponential_moving_average(&ema, period);
    window::zip_with(&ema, &ema_of_ema, |e, ee| 2.0 * e - ee)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::window::defined;

    fn close(v: &Option<f64>) -> f64 {
        v.expect("defined")
    }

    #[test]
    fn sma_is_undefined_until_window_fills() {
        let values = defined(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let out = sma(&values, 3);
        assert_eq!(out, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn ema_matches_recursive_definition() {
        // alpha = 0.5
        let values = defined(&[10.0, 11.0, 12.0, 13.0]);
        let out = exponential_moving_average(&values, 3);
        assert!(out[..2].iter().all(Option::is_none));
        assert!((close(&out[2]) - 11.25).abs() < 1e-12);
        assert!((close(&out[3]) - 12.125).abs() < 1e-12);
    }

    #[test]
    fn dema_needs_two_warmups() {
        let values = defined(&(1..=10).map(f64::from).collect::<Vec<_>>());
        let out = dema(&values, 3);
        // EMA defined from index 2, EMA of EMA three samples later.
        assert!(out[..4].iter().all(Option::is_none));
        assert!(out[4..].iter().all(Option::is_some));
    }

    #[test]
    fn dema_of_constant_series_is_constant() {
        let values = defined(&[7.0; 12]);
        let out = dema(&values, 4);
        for v in out.iter().flatten() {
            assert!((v - 7.0).abs() < 1e-12);
        }
    }

    #[test]
    fn short_series_is_undefined_everywhere() {
        let values = defined(&[1.0, 2.0, 3.0]);
        assert!(sma(&values, 4).iter().all(Option::is_none));
        assert!(exponential_moving_average(&values, 4).iter().all(Option::is_none));
        assert!(dema(&values, 4).iter().all(Option::is_none));
    }
}
