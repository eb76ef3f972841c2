use std::ops::Range;

use chrono::NaiveDate;

use super::{
    ma, momentum, supertrend, trend, volatility,
    window::{self, Column},
};
use crate::{constants, model};

/// Window lengths of every indicator in an [`IndicatorSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub ma_short: usize,
    pub ma_long: usize,
    pub atr_window: usize,
    pub supertrend_multiplier: f64,
    pub bollinger_window: usize,
    pub bollinger_dev: f64,
    pub rsi_window: usize,
    pub stoch_smooth_k: usize,
    pub stoch_smooth_d: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub ichimoku_conversion: usize,
    pub ichimoku_base: usize,
    pub ichimoku_span_b: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ma_short: constants::SMA_WINDOWS.0,
            ma_long: constants::SMA_WINDOWS.1,
            atr_window: constants::ATR_WINDOW,
            supertrend_multiplier: constants::SUPERTREND_MULTIPLIER,
            bollinger_window: constants::BOLLINGER_WINDOW,
            bollinger_dev: constants::BOLLINGER_DEV,
            rsi_window: constants::RSI_WINDOW,
            stoch_smooth_k: constants::STOCH_RSI_SMOOTH.0,
            stoch_smooth_d: constants::STOCH_RSI_SMOOTH.1,
            macd_fast: constants::MACD_FAST,
            macd_slow: constants::MACD_SLOW,
            macd_signal: constants::MACD_SIGNAL,
            ichimoku_conversion: constants::ICHIMOKU_WINDOWS.0,
            ichimoku_base: constants::ICHIMOKU_WINDOWS.1,
            ichimoku_span_b: constants::ICHIMOKU_WINDOWS.2,
        }
    }
}

/// Derived columns of one series. Never persisted, recomputed on request.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub sma_short: Column,
    pub sma_long: Column,
    pub ema_short: Column,
    pub ema_long: Column,
    pub dema_short: Column,
    pub dema_long: Column,
    pub atr: Column,
    pub bollinger: volatility::BollingerBands,
    pub macd: trend::Macd,
    pub rsi: Column,
    pub stoch_rsi: momentum::StochRsi,
    pub ichimoku: trend::Ichimoku,
    pub supertrend: supertrend::Supertrend,
}

impl IndicatorSet {
    pub fn compute(series: &model::Series, config: &IndicatorConfig) -> Self {
        let high = series.highs();
        let low = series.lows();
        let close = series.closes();
        let close_col = window::defined(&close);

        Self {
            sma_short: ma::sma(&close_col, config.ma_short),
            sma_long: ma::sma(&close_col, config.ma_long),
            ema_short: ma::exponential_moving_average(&close_col, config.ma_short),
            ema_long: ma::exponential_moving_average(&close_col, config.ma_long),
            dema_short: ma::dema(&close_col, config.ma_short),
            dema_long: ma::dema(&close_col, config.ma_long),
            atr: volatility::average_true_range(&high, &low, &close, config.atr_window),
            bollinger: volatility::bollinger(
                &close_col,
                config.bollinger_window,
                config.bollinger_dev,
            ),
            macd: trend::macd(
                &close_col,
                config.macd_fast,
                config.macd_slow,
                config.macd_signal,
            ),
            rsi: momentum::rsi(&close, config.rsi_window),
            stoch_rsi: momentum::stoch_rsi(
                &close,
                config.rsi_window,
                config.stoch_smooth_k,
                config.stoch_smooth_d,
            ),
            ichimoku: trend::ichimoku(
                &high,
                &low,
                config.ichimoku_conversion,
                config.ichimoku_base,
                config.ichimoku_span_b,
            ),
            supertrend: supertrend::supertrend(
                &high,
                &low,
                &close,
                config.atr_window,
                config.supertrend_multiplier,
            ),
        }
    }

    /// Numeric columns in export order, named after their windows.
    pub fn columns(&self, config: &IndicatorConfig) -> Vec<(String, &Column)> {
        let (s, l) = (config.ma_short, config.ma_long);
        vec![
            (format!("sma_{s}"), &self.sma_short),
            (format!("sma_{l}"), &self.sma_long),
            (format!("ema_{s}"), &self.ema_short),
            (format!("ema_{l}"), &self.ema_long),
            (format!("dema_{s}"), &self.dema_short),
            (format!("dema_{l}"), &self.dema_long),
            ("atr".into(), &self.atr),
            ("ichimoku_conversion".into(), &self.ichimoku.conversion),
            ("ichimoku_base_line".into(), &self.ichimoku.base),
            ("ichimoku_a".into(), &self.ichimoku.span_a),
            ("ichimoku_b".into(), &self.ichimoku.span_b),
            ("bollinger_hband".into(), &self.bollinger.hband),
            ("bollinger_mband".into(), &self.bollinger.mband),
            ("bollinger_lband".into(), &self.bollinger.lband),
            ("macd".into(), &self.macd.macd),
            ("macd_signal".into(), &self.macd.signal),
            ("macd_diff".into(), &self.macd.diff),
            ("rsi".into(), &self.rsi),
            ("stochrsi".into(), &self.stoch_rsi.stochrsi),
            ("stochrsi_k".into(), &self.stoch_rsi.k),
            ("stochrsi_d".into(), &self.stoch_rsi.d),
            ("basic_uband".into(), &self.supertrend.basic_upper),
            ("basic_lband".into(), &self.supertrend.basic_lower),
            ("upperband".into(), &self.supertrend.upper_band),
            ("lowerband".into(), &self.supertrend.lower_band),
        ]
    }
}

/// A series together with its indicators, row aligned.
#[derive(Debug, Clone)]
pub struct AnnotatedSeries {
    pub series: model::Series,
    pub config: IndicatorConfig,
    pub indicators: IndicatorSet,
}

impl AnnotatedSeries {
    pub fn new(series: model::Series, config: IndicatorConfig) -> Self {
        let indicators = IndicatorSet::compute(&series, &config);
        Self {
            series,
            config,
            indicators,
        }
    }

    /// Row indices whose open date lies within `[start, end]` (both optional,
    /// both inclusive).
    pub fn rows_between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Range<usize> {
        let date_of = |c: &model::Candle| c.open_time().map(|t| t.date_naive());
        let candles = &self.series.candles;
        let from = match start {
            Some(start) => candles.partition_point(|c| date_of(c).is_some_and(|d| d < start)),
            None => 0,
        };
        let to = match end {
            Some(end) => candles.partition_point(|c| date_of(c).is_some_and(|d| d <= end)),
            None => candles.len(),
        };
        from..to.max(from)
    }
}
