// Binance market data source.
pub mod binance {
    // Klines and exchange info requests.
    pub mod api_caller;
    // Payload structures and kline row parsing.
    pub mod response;
}
// HTTP client module.
pub mod http {
    // HTTP client implementation.
    pub mod client;
}
// Technical indicators.
pub mod indicators {
    // Column helpers.
    pub mod window;
    /// Moving averages.
    pub mod ma;
    /// True range, ATR and Bollinger bands.
    pub mod volatility;
    /// RSI and stochastic RSI.
    pub mod momentum;
    /// MACD and Ichimoku.
    pub mod trend;
    /// Sequential supertrend scan.
    pub mod supertrend;
    /// The full indicator battery of a series.
    pub mod set;
}
// Data storage module.
pub mod store {
    /// SQLite database interaction.
    pub mod sqlite;
    /// Table-per-symbol series storage.
    pub mod series;
    /// In-memory series storage.
    #[cfg(test)]
    pub mod memory;
}
// Environment settings.
pub mod config;
// module storing defaults
pub mod constants;
// CSV output of annotated series.
pub mod export;
// Merge of fetched candles into stored series.
pub mod merge;
// Data models.
pub mod model;
// Market data provider capability.
pub mod source;
// Symbols file reader.
pub mod symbols;
// Sync pass over all symbols.
pub mod sync;
