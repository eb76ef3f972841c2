use std::env;

use crate::constants;

/// Runtime settings taken from the environment (`.env` is loaded first).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub sqlite_file: String,
    pub binance_base_url: String,
    pub binance_api_key: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            sqlite_file: non_empty("sqlite_file")
                .unwrap_or_else(|| constants::DEFAULT_SQLITE_FILE.into()),
            binance_base_url: non_empty("binance_base_url")
                .unwrap_or_else(|| constants::DEFAULT_BINANCE_BASE_URL.into()),
            binance_api_key: non_empty("binance_api_key"),
        }
    }
}
