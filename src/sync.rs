use std::{fmt::Display, time::Duration};

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::{
    constants,
    merge::{self, MergeStats},
    model,
    source::CandleSource,
    store::series::SeriesStore,
};

/// Knobs of one sync pass.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub interval: String,
    pub backfill_days: u64,
    pub incremental_days: u64,
    pub pacing: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: constants::DEFAULT_INTERVAL.into(),
            backfill_days: constants::BACKFILL_DAYS,
            incremental_days: constants::INCREMENTAL_DAYS,
            pacing: Duration::from_millis(constants::PACING_MS),
        }
    }
}

/// Where a symbol is in its fetch → merge → persist cycle.
///
/// `NotFound → Backfilling → Present` for a new symbol and
/// `Present → Syncing → Present` for a stored one. A failure in either
/// working state falls back to the state it started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolState {
    NotFound,
    Backfilling,
    Present,
    Syncing,
}

impl SymbolState {
    fn begin(self) -> Self {
        match self {
            SymbolState::NotFound | SymbolState::Backfilling => SymbolState::Backfilling,
            SymbolState::Present | SymbolState::Syncing => SymbolState::Syncing,
        }
    }

    fn lookback_days(self, config: &SyncConfig) -> u64 {
        match self {
            SymbolState::NotFound | SymbolState::Backfilling => config.backfill_days,
            SymbolState::Present | SymbolState::Syncing => config.incremental_days,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    /// First series written for the symbol.
    Backfilled { rows: usize },
    /// Stored series merged with the fetched window and rewritten.
    Updated(MergeStats),
    /// Provider returned nothing, store untouched.
    NoData(SymbolState),
    /// Fetch or storage failed, store untouched.
    Failed(String),
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub outcomes: Vec<(String, SymbolOutcome)>,
}

impl SyncReport {
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, SymbolOutcome::Failed(_)))
            .count()
    }

    pub fn outcome(&self, symbol: &str) -> Option<&SymbolOutcome> {
        self.outcomes
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, o)| o)
    }
}

impl Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = |pred: fn(&SymbolOutcome) -> bool| {
            self.outcomes.iter().filter(|(_, o)| pred(o)).count()
        };
        write!(
            f,
            "{} symbols: {} backfilled, {} updated, {} without data, {} failed",
            self.outcomes.len(),
            count(|o| matches!(o, SymbolOutcome::Backfilled { .. })),
            count(|o| matches!(o, SymbolOutcome::Updated(_))),
            count(|o| matches!(o, SymbolOutcome::NoData(_))),
            self.failed(),
        )
    }
}

/// Runs one sync pass over `symbols`, one symbol at a time.
///
/// A failing symbol is logged and recorded; the pass carries on with the
/// next one. The store's sync lock is held for the whole pass.
pub async fn sync_symbols<S, T>(
    source: &S,
    store: &mut T,
    symbols: &[String],
    config: &SyncConfig,
    now: DateTime<Utc>,
) -> model::Result<SyncReport>
where
    S: CandleSource,
    T: SeriesStore,
{
    let owner = format!("kline_sync:{}", std::process::id());
    let query_time_ms = now.timestamp_millis();
    store.try_lock(&owner, query_time_ms)?;

    let today = now.date_naive();
    let mut report = SyncReport::default();
    for (i, symbol) in symbols.iter().enumerate() {
        let outcome = match sync_symbol(source, store, symbol, config, today, query_time_ms).await {
            Ok(outcome) => {
                log::info!("{symbol}: {outcome:?}");
                outcome
            }
            Err(e) => {
                log::error!("{symbol}: sync failed, continuing: {e}");
                SymbolOutcome::Failed(e.to_string())
            }
        };
        report.outcomes.push((symbol.clone(), outcome));

        if i + 1 < symbols.len() && !config.pacing.is_zero() {
            tokio::time::sleep(config.pacing).await;
        }
    }

    if let Err(e) = store.unlock(&owner) {
        log::error!("failed to release sync lock: {e}");
    }
    Ok(report)
}

async fn sync_symbol<S, T>(
    source: &S,
    store: &mut T,
    symbol: &str,
    config: &SyncConfig,
    today: NaiveDate,
    query_time_ms: i64,
) -> model::Result<SymbolOutcome>
where
    S: CandleSource,
    T: SeriesStore,
{
    let from = if store.exists(symbol)? {
        SymbolState::Present
    } else {
        SymbolState::NotFound
    };
    let phase = from.begin();
    let since = today
        .checked_sub_days(Days::new(phase.lookback_days(config)))
        .unwrap_or(NaiveDate::MIN);
    log::info!("{symbol}: {phase:?} since {since}");

    let incoming = source
        .fetch_candles(symbol, &config.interval, since, query_time_ms)
        .await?;
    if incoming.is_empty() {
        log::warn!("{symbol}: provider returned no candles");
        return Ok(SymbolOutcome::NoData(from));
    }

    let existing = match phase {
        SymbolState::Backfilling => model::Series::empty(symbol),
        _ => store.load(symbol)?,
    };
    let (merged, stats) = merge::merge_with_stats(existing, incoming, query_time_ms);
    store.save(&merged)?;

    Ok(match phase {
        SymbolState::Backfilling => SymbolOutcome::Backfilled { rows: stats.after },
        _ => SymbolOutcome::Updated(stats),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        http::client::RequestError,
        source::ProviderError,
        store::memory::MemoryStore,
    };
    use chrono::TimeZone;
    use std::{cell::RefCell, collections::HashMap};

    const NOW_MS: i64 = 1_710_936_000_000; // 2024-03-20T12:00:00Z

    enum Reply {
        Candles(Vec<(i64, f64)>),
        Fail,
    }

    #[derive(Default)]
    struct FakeSource {
        replies: HashMap<String, Reply>,
        calls: RefCell<Vec<(String, NaiveDate)>>,
    }

    impl FakeSource {
        fn with(mut self, symbol: &str, reply: Reply) -> Self {
            self.replies.insert(symbol.into(), reply);
            self
        }
    }

    impl CandleSource for FakeSource {
        async fn fetch_candles(
            &self,
            symbol: &str,
            _interval: &str,
            since: NaiveDate,
            fetched_at_ms: i64,
        ) -> Result<Vec<model::Candle>, ProviderError> {
            self.calls.borrow_mut().push((symbol.into(), since));
            match self.replies.get(symbol) {
                Some(Reply::Candles(rows)) => Ok(rows
                    .iter()
                    .map(|&(t, close)| candle(t, close, fetched_at_ms))
                    .collect()),
                Some(Reply::Fail) => Err(ProviderError::Request(RequestError::Other(
                    "rate limited".into(),
                ))),
                None => Ok(Vec::new()),
            }
        }

        async fn list_tradable_symbols(
            &self,
            quote_suffix: &str,
        ) -> Result<Vec<String>, ProviderError> {
            Ok(self
                .replies
                .keys()
                .filter(|s| s.ends_with(quote_suffix))
                .cloned()
                .collect())
        }
    }

    fn candle(open_time_ms: i64, close: f64, fetched_at_ms: i64) -> model::Candle {
        model::Candle {
            open_time_ms,
            open: close,
            high: close,
            low: close,
            close,
            fetched_at_ms,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(NOW_MS).unwrap()
    }

    fn config() -> SyncConfig {
        SyncConfig {
            pacing: Duration::ZERO,
            ..Default::default()
        }
    }

    fn symbols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn seeded(symbol: &str, rows: &[(i64, f64)]) -> model::Series {
        model::Series::new(symbol, rows.iter().map(|&(t, c)| candle(t, c, 1)).collect())
    }

    #[tokio::test]
    async fn new_symbol_is_backfilled_from_far_back() {
        let source =
            FakeSource::default().with("BTCUSDT", Reply::Candles(vec![(2, 2.0), (1, 1.0)]));
        let mut store = MemoryStore::default();

        let report = sync_symbols(&source, &mut store, &symbols(&["BTCUSDT"]), &config(), now())
            .await
            .unwrap();

        assert_eq!(report.outcome("BTCUSDT"), Some(&SymbolOutcome::Backfilled { rows: 2 }));
        assert_eq!(
            source.calls.borrow().as_slice(),
            &[("BTCUSDT".to_string(), NaiveDate::from_ymd_opt(2023, 2, 14).unwrap())]
        );
        let stored = &store.series["BTCUSDT"];
        assert!(stored.is_canonical());
        assert!(stored.candles.iter().all(|c| c.fetched_at_ms == NOW_MS));
    }

    #[tokio::test]
    async fn stored_symbol_gets_incremental_merge() {
        let source =
            FakeSource::default().with("ETHUSDT", Reply::Candles(vec![(2, 20.0), (3, 30.0)]));
        let mut store = MemoryStore::default();
        store.save(&seeded("ETHUSDT", &[(1, 1.0), (2, 2.0)])).unwrap();

        let report = sync_symbols(&source, &mut store, &symbols(&["ETHUSDT"]), &config(), now())
            .await
            .unwrap();

        assert_eq!(
            report.outcome("ETHUSDT"),
            Some(&SymbolOutcome::Updated(MergeStats {
                before: 2,
                after: 3,
                added: 1,
                replaced: 1
            }))
        );
        assert_eq!(
            source.calls.borrow()[0].1,
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert_eq!(store.series["ETHUSDT"].closes(), vec![1.0, 20.0, 30.0]);
    }

    #[tokio::test]
    async fn one_failing_symbol_does_not_stop_the_pass() {
        let source = FakeSource::default()
            .with("AUSDT", Reply::Candles(vec![(1, 10.0)]))
            .with("BUSDT", Reply::Fail)
            .with("CUSDT", Reply::Candles(vec![(2, 30.0)]));
        let mut store = MemoryStore::default();
        let b_before = seeded("BUSDT", &[(1, 5.0)]);
        store.save(&seeded("AUSDT", &[(0, 1.0)])).unwrap();
        store.save(&b_before).unwrap();
        store.save(&seeded("CUSDT", &[(0, 3.0)])).unwrap();

        let report = sync_symbols(
            &source,
            &mut store,
            &symbols(&["AUSDT", "BUSDT", "CUSDT"]),
            &config(),
            now(),
        )
        .await
        .unwrap();

        assert_eq!(report.failed(), 1);
        assert!(matches!(report.outcome("BUSDT"), Some(SymbolOutcome::Failed(_))));
        assert_eq!(store.series["AUSDT"].closes(), vec![1.0, 10.0]);
        assert_eq!(store.series["BUSDT"], b_before);
        assert_eq!(store.series["CUSDT"].closes(), vec![3.0, 30.0]);
        assert_eq!(source.calls.borrow().len(), 3);
        assert!(store.lock_owner.is_none());
    }

    #[tokio::test]
    async fn empty_fetch_leaves_store_untouched() {
        let source = FakeSource::default();
        let mut store = MemoryStore::default();
        let stored = seeded("SOLUSDT", &[(1, 1.0)]);
        store.save(&stored).unwrap();
        let saves = store.saves;

        let report = sync_symbols(
            &source,
            &mut store,
            &symbols(&["SOLUSDT", "NEWUSDT"]),
            &config(),
            now(),
        )
        .await
        .unwrap();

        assert_eq!(
            report.outcome("SOLUSDT"),
            Some(&SymbolOutcome::NoData(SymbolState::Present))
        );
        assert_eq!(
            report.outcome("NEWUSDT"),
            Some(&SymbolOutcome::NoData(SymbolState::NotFound))
        );
        assert_eq!(store.series["SOLUSDT"], stored);
        assert!(!store.series.contains_key("NEWUSDT"));
        assert_eq!(store.saves, saves);
    }

    #[tokio::test]
    async fn invalid_symbol_is_isolated_like_any_failure() {
        let source = FakeSource::default().with("BTCUSDT", Reply::Candles(vec![(1, 1.0)]));
        let mut store = MemoryStore::default();

        let report = sync_symbols(
            &source,
            &mut store,
            &symbols(&["BAD-SYMBOL", "BTCUSDT"]),
            &config(),
            now(),
        )
        .await
        .unwrap();

        assert!(matches!(report.outcome("BAD-SYMBOL"), Some(SymbolOutcome::Failed(_))));
        assert!(store.series.contains_key("BTCUSDT"));
        assert_eq!(
            report.to_string(),
            "2 symbols: 1 backfilled, 0 updated, 0 without data, 1 failed"
        );
    }

    #[tokio::test]
    async fn held_lock_aborts_the_pass() {
        let source = FakeSource::default().with("BTCUSDT", Reply::Candles(vec![(1, 1.0)]));
        let mut store = MemoryStore {
            lock_owner: Some("other".into()),
            ..Default::default()
        };

        let result =
            sync_symbols(&source, &mut store, &symbols(&["BTCUSDT"]), &config(), now()).await;
        assert!(matches!(result, Err(model::SyncError::StoreLocked(_))));
        assert!(source.calls.borrow().is_empty());
    }

    #[test]
    fn working_states_follow_the_stored_state() {
        assert_eq!(SymbolState::NotFound.begin(), SymbolState::Backfilling);
        assert_eq!(SymbolState::Present.begin(), SymbolState::Syncing);
        assert_eq!(SymbolState::Backfilling.lookback_days(&config()), 400);
        assert_eq!(SymbolState::Syncing.lookback_days(&config()), 15);
    }
}
