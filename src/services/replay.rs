//! Replays recorded bars as if they arrived live.
//!
//! The file holds a JSON array of bar series. Each call to
//! `list_active_instruments` marks a new polling iteration and reveals one more
//! bar of every series, so a monitor loop sees the history unfold bar by bar.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::info;

use crate::models::indicators::{Bar, BarSeries};
use crate::services::market_data::{matches_pattern, MarketDataError, MarketDataProvider};

pub struct ReplayMarketDataProvider {
    series: HashMap<(String, u64), Vec<Bar>>,
    cursor: AtomicUsize,
    longest: usize,
}

impl ReplayMarketDataProvider {
    /// `warmup` bars are visible before the first iteration.
    pub fn new(series: Vec<BarSeries>, warmup: usize) -> Self {
        let longest = series.iter().map(BarSeries::len).max().unwrap_or(0);
        let series = series
            .into_iter()
            .map(|s| ((s.instrument, s.timeframe_secs), s.bars))
            .collect();
        Self {
            series,
            cursor: AtomicUsize::new(warmup.min(longest)),
            longest,
        }
    }

    pub async fn from_file(path: impl AsRef<Path>, warmup: usize) -> Result<Self, MarketDataError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let series: Vec<BarSeries> = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            series = series.len(),
            "loaded replay bars"
        );
        Ok(Self::new(series, warmup))
    }

    /// Number of bars per series currently visible
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor() >= self.longest
    }

    fn advance(&self) {
        let longest = self.longest;
        let _ = self
            .cursor
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |c| {
                (c < longest).then_some(c + 1)
            });
    }
}

#[async_trait]
impl MarketDataProvider for ReplayMarketDataProvider {
    async fn fetch_bars(
        &self,
        instrument: &str,
        timeframe_secs: u64,
        minimum_count: usize,
    ) -> Result<BarSeries, MarketDataError> {
        let bars = self
            .series
            .get(&(instrument.to_string(), timeframe_secs))
            .ok_or_else(|| MarketDataError::unavailable(instrument, "not in replay file"))?;
        let visible = &bars[..self.cursor().min(bars.len())];
        if visible.len() < minimum_count {
            return Err(MarketDataError::unavailable(
                instrument,
                format!("{} bars replayed, {} requested", visible.len(), minimum_count),
            ));
        }
        Ok(BarSeries::new(instrument, timeframe_secs, visible.to_vec()))
    }

    async fn list_active_instruments(
        &self,
        pattern: &str,
    ) -> Result<BTreeSet<String>, MarketDataError> {
        self.advance();
        Ok(self
            .series
            .keys()
            .map(|(id, _)| id)
            .filter(|id| matches_pattern(id, pattern))
            .cloned()
            .collect())
    }
}
