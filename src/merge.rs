use std::collections::{BTreeMap, BTreeSet};

use crate::model;

/// Row accounting of one merge, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeStats {
    pub before: usize,
    pub after: usize,
    pub added: usize,
    pub replaced: usize,
}

/// Merges freshly fetched candles into a stored series.
///
/// On a shared `open_time_ms` the most recently fetched row wins. Every
/// surviving row is re-stamped with `query_time_ms` and the result is
/// ascending by open time. An empty `incoming` returns `existing` untouched.
pub fn merge(
    existing: model::Series,
    incoming: Vec<model::Candle>,
    query_time_ms: i64,
) -> model::Series {
    merge_with_stats(existing, incoming, query_time_ms).0
}

pub fn merge_with_stats(
    existing: model::Series,
    incoming: Vec<model::Candle>,
    query_time_ms: i64,
) -> (model::Series, MergeStats) {
    let before = existing.len();
    if incoming.is_empty() {
        let stats = MergeStats {
            before,
            after: before,
            ..Default::default()
        };
        return (existing, stats);
    }

    let symbol = existing.symbol;
    let incoming_times: BTreeSet<i64> = incoming.iter().map(|c| c.open_time_ms).collect();
    let mut rows = existing.candles;
    rows.extend(incoming);

    // Stable, so rows with equal keys keep existing-before-incoming order.
    rows.sort_by_key(|c| (c.fetched_at_ms, c.open_time_ms));

    let mut by_open_time: BTreeMap<i64, model::Candle> = BTreeMap::new();
    for candle in rows {
        by_open_time.insert(candle.open_time_ms, candle);
    }

    let candles: Vec<model::Candle> = by_open_time
        .into_values()
        .map(|mut c| {
            c.fetched_at_ms = query_time_ms;
            c
        })
        .collect();

    let after = candles.len();
    let added = after.saturating_sub(before);
    let stats = MergeStats {
        before,
        after,
        added,
        replaced: incoming_times.len().saturating_sub(added),
    };
    (model::Series::new(&symbol, candles), stats)
}
