use std::collections::BTreeMap;

use super::series::{SeriesStore, validate_symbol};
use crate::model::{self, SyncError};

/// In-process store used by the orchestrator tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub series: BTreeMap<String, model::Series>,
    pub lock_owner: Option<String>,
    pub saves: usize,
}

impl SeriesStore for MemoryStore {
    fn exists(&self, symbol: &str) -> model::Result<bool> {
        Ok(self.series.contains_key(validate_symbol(symbol)?))
    }

    fn load(&self, symbol: &str) -> model::Result<model::Series> {
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| SyncError::SeriesNotFound(symbol.into()))
    }

    fn save(&mut self, series: &model::Series) -> model::Result<()> {
        validate_symbol(&series.symbol)?;
        self.saves += 1;
        self.series.insert(series.symbol.clone(), series.clone());
        Ok(())
    }

    fn list_symbols(&self) -> model::Result<Vec<String>> {
        Ok(self.series.keys().cloned().collect())
    }

    fn try_lock(&mut self, owner: &str, _now_ms: i64) -> model::Result<()> {
        match &self.lock_owner {
            Some(holder) => Err(SyncError::StoreLocked(holder.clone())),
            None => {
                self.lock_owner = Some(owner.into());
                Ok(())
            }
        }
    }

    fn unlock(&mut self, owner: &str) -> model::Result<()> {
        if self.lock_owner.as_deref() == Some(owner) {
            self.lock_owner = None;
        }
        Ok(())
    }
}
