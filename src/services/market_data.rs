//! Market data provider interface.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::indicators::{Bar, BarSeries};

#[derive(Debug, Error)]
pub enum MarketDataError {
    /// Transient: the source cannot serve the request right now
    #[error("data unavailable for {instrument}: {reason}")]
    DataUnavailable { instrument: String, reason: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl MarketDataError {
    pub fn unavailable(instrument: &str, reason: impl Into<String>) -> Self {
        MarketDataError::DataUnavailable {
            instrument: instrument.to_string(),
            reason: reason.into(),
        }
    }
}

/// Case-sensitive substring match; an empty pattern matches everything.
pub fn matches_pattern(instrument: &str, pattern: &str) -> bool {
    pattern.is_empty() || instrument.contains(pattern)
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Bars of `instrument` sampled every `timeframe_secs`, oldest first.
    /// Fails with `DataUnavailable` when fewer than `minimum_count` bars exist.
    async fn fetch_bars(
        &self,
        instrument: &str,
        timeframe_secs: u64,
        minimum_count: usize,
    ) -> Result<BarSeries, MarketDataError>;

    /// Instruments currently tradable whose identifier matches `pattern`
    async fn list_active_instruments(
        &self,
        pattern: &str,
    ) -> Result<BTreeSet<String>, MarketDataError>;
}

/// Provider backed by bars held in memory. Used by tests and demos.
#[derive(Default)]
pub struct InMemoryMarketDataProvider {
    series: RwLock<HashMap<(String, u64), Vec<Bar>>>,
}

impl InMemoryMarketDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_bars(&self, instrument: &str, timeframe_secs: u64, bars: Vec<Bar>) {
        let mut series = self.series.write().await;
        series.insert((instrument.to_string(), timeframe_secs), bars);
    }

    pub async fn push_bar(&self, instrument: &str, timeframe_secs: u64, bar: Bar) {
        let mut series = self.series.write().await;
        series
            .entry((instrument.to_string(), timeframe_secs))
            .or_default()
            .push(bar);
    }

    pub async fn remove(&self, instrument: &str) {
        let mut series = self.series.write().await;
        series.retain(|(id, _), _| id != instrument);
    }
}

#[async_trait]
impl MarketDataProvider for InMemoryMarketDataProvider {
    async fn fetch_bars(
        &self,
        instrument: &str,
        timeframe_secs: u64,
        minimum_count: usize,
    ) -> Result<BarSeries, MarketDataError> {
        let series = self.series.read().await;
        let bars = series
            .get(&(instrument.to_string(), timeframe_secs))
            .ok_or_else(|| MarketDataError::unavailable(instrument, "no such series"))?;
        if bars.len() < minimum_count {
            return Err(MarketDataError::unavailable(
                instrument,
                format!("{} bars available, {} requested", bars.len(), minimum_count),
            ));
        }
        Ok(BarSeries::new(instrument, timeframe_secs, bars.clone()))
    }

    async fn list_active_instruments(
        &self,
        pattern: &str,
    ) -> Result<BTreeSet<String>, MarketDataError> {
        let series = self.series.read().await;
        Ok(series
            .keys()
            .map(|(id, _)| id)
            .filter(|id| matches_pattern(id, pattern))
            .cloned()
            .collect())
    }
}
