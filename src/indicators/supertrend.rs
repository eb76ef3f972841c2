//! Supertrend: a trend-following band pair that ratchets with the trend.
//!
//! Unlike the other transforms this one is path dependent. Each step reads
//! the previous step's (possibly clamped) bands, so it is computed as a
//! single left-to-right fold and any change to a prefix means replaying the
//! scan from that point.

use super::{volatility, window::Column};

/// Per-sample supertrend output, aligned with the input candles. Every
/// position is defined; before the ATR warm-up is over the bands sit on `hl2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Supertrend {
    pub in_uptrend: Vec<Option<bool>>,
    pub upper_band: Column,
    pub lower_band: Column,
    /// Unclamped `hl2 + m*atr`.
    pub basic_upper: Column,
    /// Unclamped `hl2 - m*atr`.
    pub basic_lower: Column,
}

impl Supertrend {
    /// The active trailing line: lower band in an uptrend, upper band otherwise.
    pub fn line(&self) -> Column {
        self.in_uptrend
            .iter()
            .zip(self.upper_band.iter().zip(&self.lower_band))
            .map(|(up, (upper, lower))| match (*up)? {
                true => *lower,
                false => *upper,
            })
            .collect()
    }
}

// State carried from one sample to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Band {
    in_uptrend: bool,
    upper: f64,
    lower: f64,
}

impl Band {
    fn seed(basic_upper: f64, basic_lower: f64) -> Self {
        Self {
            in_uptrend: true,
            upper: basic_upper,
            lower: basic_lower,
        }
    }

    fn next(self, close: f64, basic_upper: f64, basic_lower: f64) -> Self {
        let raw = |in_uptrend| Self {
            in_uptrend,
            upper: basic_upper,
            lower: basic_lower,
        };

        if close > self.upper {
            return raw(true);
        }
        if close < self.lower {
            return raw(false);
        }

        let mut band = raw(self.in_uptrend);
        // The lower band never retreats inside an uptrend, the upper band
        // never rises inside a downtrend.
        if band.in_uptrend && basic_lower < self.lower {
            band.lower = self.lower;
        }
        if !band.in_uptrend && basic_upper > self.upper {
            band.upper = self.upper;
        }
        band
    }
}

/// Computes the supertrend over `atr_period` with band width `multiplier`.
///
/// The scan starts at the first sample in an uptrend with the raw bands. An
/// ATR still in its warm-up counts as zero, so early bands collapse onto `hl2`.
pub fn supertrend(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    atr_period: usize,
    multiplier: f64,
) -> Supertrend {
    let atrs = volatility::average_true_range(high, low, close, atr_period);
    let n = atrs.len();

    let mut out = Supertrend {
        in_uptrend: Vec::with_capacity(n),
        upper_band: Vec::with_capacity(n),
        lower_band: Vec::with_capacity(n),
        basic_upper: Vec::with_capacity(n),
        basic_lower: Vec::with_capacity(n),
    };

    let mut prev: Option<Band> = None;
    for i in 0..n {
        let atr = atrs[i].unwrap_or(0.0);
        let hl2 = (high[i] + low[i]) / 2.0;
        let basic_upper = hl2 + multiplier * atr;
        let basic_lower = hl2 - multiplier * atr;

        let band = match prev {
            None => Band::seed(basic_upper, basic_lower),
            Some(p) => p.next(close[i], basic_upper, basic_lower),
        };

        out.in_uptrend.push(Some(band.in_uptrend));
        out.upper_band.push(Some(band.upper));
        out.lower_band.push(Some(band.lower));
        out.basic_upper.push(Some(basic_upper));
        out.basic_lower.push(Some(basic_lower));
        prev = Some(band);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HIGH: [f64; 5] = [10.0, 12.0, 9.0, 14.0, 8.0];
    const LOW: [f64; 5] = [8.0, 9.0, 7.0, 10.0, 6.0];
    const CLOSE: [f64; 5] = [9.0, 11.0, 8.0, 13.0, 7.0];

    #[test]
    fn five_bar_scenario() {
        // ATR(3) = 0,0,3,4,5 (zero during warm-up); hl2 = 9,10.5,8,12,7.
        let st = supertrend(&HIGH, &LOW, &CLOSE, 3, 3.0);

        assert_eq!(st.in_uptrend[0], Some(true));
        assert_eq!(st.upper_band[0], Some(9.0));
        assert_eq!(st.lower_band[0], Some(9.0));

        let some = |v: [f64; 5]| v.map(Some).to_vec();
        assert_eq!(
            st.in_uptrend,
            vec![Some(true), Some(true), Some(false), Some(false), Some(false)]
        );
        assert_eq!(st.basic_upper, some([9.0, 10.5, 17.0, 24.0, 22.0]));
        assert_eq!(st.basic_lower, some([9.0, 10.5, -1.0, 0.0, -8.0]));
        // Close 8 drops below the previous lower band 10.5 and flips the
        // trend; the upper band then holds at 17 instead of rising.
        assert_eq!(st.upper_band, some([9.0, 10.5, 17.0, 17.0, 17.0]));
        assert_eq!(st.lower_band, some([9.0, 10.5, -1.0, 0.0, -8.0]));
        assert_eq!(st.line(), some([9.0, 10.5, 17.0, 17.0, 17.0]));
    }

    #[test]
    fn flips_reset_bands_to_raw() {
        let prev = Band {
            in_uptrend: true,
            upper: 20.0,
            lower: 10.0,
        };
        let down = prev.next(9.0, 25.0, 5.0);
        assert_eq!(
            down,
            Band {
                in_uptrend: false,
                upper: 25.0,
                lower: 5.0
            }
        );

        let up = down.next(26.0, 30.0, 20.0);
        assert_eq!(
            up,
            Band {
                in_uptrend: true,
                upper: 30.0,
                lower: 20.0
            }
        );
    }

    #[test]
    fn downtrend_holds_upper_band() {
        let prev = Band {
            in_uptrend: false,
            upper: 20.0,
            lower: 10.0,
        };
        let next = prev.next(15.0, 22.0, 8.0);
        assert!(!next.in_uptrend);
        assert_eq!(next.upper, 20.0);
        assert_eq!(next.lower, 8.0);

        let lower_upper = prev.next(15.0, 18.0, 8.0);
        assert_eq!(lower_upper.upper, 18.0);
    }

    #[test]
    fn short_series_bands_sit_on_hl2() {
        let st = supertrend(&HIGH[..2], &LOW[..2], &CLOSE[..2], 3, 3.0);
        assert_eq!(st.in_uptrend, vec![Some(true), Some(true)]);
        assert_eq!(st.upper_band, vec![Some(9.0), Some(10.5)]);
        assert_eq!(st.lower_band, vec![Some(9.0), Some(10.5)]);
    }

    fn bars() -> impl Strategy<Value = Vec<(f64, f64, f64)>> {
        proptest::collection::vec((1.0f64..100.0, 0.0f64..5.0, 0.0f64..1.0), 1..120).prop_map(
            |raw| {
                raw.into_iter()
                    .map(|(mid, spread, pos)| {
                        let low = mid - spread;
                        let high = mid + spread;
                        (high, low, low + (high - low) * pos)
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn scan_is_deterministic(bars in bars(), period in 1usize..20, m in 0.5f64..5.0) {
            let high: Vec<f64> = bars.iter().map(|b| b.0).collect();
            let low: Vec<f64> = bars.iter().map(|b| b.1).collect();
            let close: Vec<f64> = bars.iter().map(|b| b.2).collect();
            prop_assert_eq!(
                supertrend(&high, &low, &close, period, m),
                supertrend(&high, &low, &close, period, m)
            );
        }

        #[test]
        fn bands_ratchet_within_a_trend(bars in bars(), period in 1usize..20, m in 0.5f64..5.0) {
            let high: Vec<f64> = bars.iter().map(|b| b.0).collect();
            let low: Vec<f64> = bars.iter().map(|b| b.1).collect();
            let close: Vec<f64> = bars.iter().map(|b| b.2).collect();
            let st = supertrend(&high, &low, &close, period, m);

            for i in 1..close.len() {
                let (Some(prev_up), Some(up)) = (st.in_uptrend[i - 1], st.in_uptrend[i]) else {
                    continue;
                };
                let lower = st.lower_band[i].unwrap();
                let prev_lower = st.lower_band[i - 1].unwrap();
                let upper = st.upper_band[i].unwrap();
                let prev_upper = st.upper_band[i - 1].unwrap();
                if prev_up && up {
                    prop_assert!(lower >= prev_lower || lower == st.basic_lower[i].unwrap());
                }
                if !prev_up && !up {
                    prop_assert!(upper <= prev_upper || upper == st.basic_upper[i].unwrap());
                }
            }
        }
    }
}
