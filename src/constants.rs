// Kline interval pulled for every symbol.
pub const DEFAULT_INTERVAL: &str = "15m";
// Symbols are discovered by this quote currency suffix.
pub const DEFAULT_QUOTE_SUFFIX: &str = "USDT";
// Lookback for a symbol that has no stored series yet.
pub const BACKFILL_DAYS: u64 = 400;
// Overlap window re-fetched for a stored symbol, absorbs late corrections.
pub const INCREMENTAL_DAYS: u64 = 15;
// Pause between two symbols, keeps us under the provider's rate limits.
pub const PACING_MS: u64 = 1_000;

pub const DEFAULT_SQLITE_FILE: &str = "database.db";
pub const DEFAULT_BINANCE_BASE_URL: &str = "https://api.binance.com";
pub const HTTP_TIMEOUT_SECS: u64 = 30;
// Binance caps one klines page at 1000 rows.
pub const KLINES_PAGE_LIMIT: usize = 1_000;

// A sync lock older than this is considered abandoned.
pub const STALE_LOCK_MS: i64 = 6 * 60 * 60 * 1_000;

// Rows kept by `show` before indicators are computed.
pub const SHOW_TAIL: usize = 2_000;

// Indicator windows.
pub const SMA_WINDOWS: (usize, usize) = (100, 200);
pub const ATR_WINDOW: usize = 14;
pub const SUPERTREND_MULTIPLIER: f64 = 3.0;
pub const BOLLINGER_WINDOW: usize = 30;
pub const BOLLINGER_DEV: f64 = 2.0;
pub const RSI_WINDOW: usize = 14;
pub const STOCH_RSI_SMOOTH: (usize, usize) = (3, 3);
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const ICHIMOKU_WINDOWS: (usize, usize, usize) = (9, 26, 52);
