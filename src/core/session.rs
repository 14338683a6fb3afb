//! Long-lived state owned by one monitoring session.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::alerts::{
    reference_label, status_label, AlertStateTracker, DailyStatsAggregator, SessionBoundary,
};
use crate::indicators::IndicatorError;
use crate::models::indicators::Bar;
use crate::models::signal::{Alert, AlertKey, SignalEvaluation};
use crate::models::strategy::StrategyConfig;
use crate::signals::StreamingEvaluator;

/// Alert memory, daily counters and per-series evaluators for one session.
///
/// Every mutation goes through `&mut self`, so observe-then-update is atomic
/// per key as long as the session has a single owner.
pub struct MonitorSession {
    strategy: StrategyConfig,
    tracker: AlertStateTracker,
    stats: DailyStatsAggregator,
    boundary: SessionBoundary,
    evaluators: HashMap<AlertKey, StreamingEvaluator>,
    reset_alerts_on_close: bool,
}

impl MonitorSession {
    pub fn new(strategy: StrategyConfig, boundary: SessionBoundary) -> Self {
        Self {
            strategy,
            tracker: AlertStateTracker::new(),
            stats: DailyStatsAggregator::new(),
            boundary,
            evaluators: HashMap::new(),
            reset_alerts_on_close: false,
        }
    }

    pub fn with_alert_reset_on_close(mut self, reset: bool) -> Self {
        self.reset_alerts_on_close = reset;
        self
    }

    pub fn strategy(&self) -> &StrategyConfig {
        &self.strategy
    }

    pub fn tracker(&self) -> &AlertStateTracker {
        &self.tracker
    }

    pub fn stats(&self) -> &DailyStatsAggregator {
        &self.stats
    }

    pub fn boundary(&self) -> &SessionBoundary {
        &self.boundary
    }

    /// Evaluate the newest bar of a series, reusing the series' incremental state.
    pub fn evaluate(
        &mut self,
        key: &AlertKey,
        bars: &[Bar],
    ) -> Result<SignalEvaluation, IndicatorError> {
        let evaluator = match self.evaluators.entry(key.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(StreamingEvaluator::new(self.strategy.clone())?),
        };
        evaluator.update(bars)
    }

    /// Run an evaluation through dedup and counting. Returns the alert to emit, if any.
    pub fn observe(&mut self, key: &AlertKey, evaluation: &SignalEvaluation) -> Option<Alert> {
        let event = evaluation.event;
        if event.is_tentative() {
            debug!(
                key = %key,
                direction = %event.direction,
                price = event.price,
                "tentative crossing, waiting for confirmation"
            );
        }
        if !self.tracker.observe(key, event.direction, event.confirmed) {
            return None;
        }

        self.stats.record(&key.instrument, event.direction);
        Some(Alert {
            key: key.clone(),
            direction: event.direction,
            status: status_label(&self.strategy.strategy, event.direction),
            price: event.price,
            reference: evaluation.reference,
            reference_label: evaluation
                .reference
                .and(reference_label(&self.strategy.strategy)),
            bar_time: evaluation.bar_time,
        })
    }

    pub fn process(
        &mut self,
        key: &AlertKey,
        bars: &[Bar],
    ) -> Result<Option<Alert>, IndicatorError> {
        let evaluation = self.evaluate(key, bars)?;
        Ok(self.observe(key, &evaluation))
    }

    /// At the session close, flush the daily report (once per date).
    pub fn check_session(&mut self, now: DateTime<Utc>) -> Option<String> {
        if !self.boundary.check(now) {
            return None;
        }
        info!(
            date = %now.with_timezone(&self.boundary.timezone()).date_naive(),
            "session close reached, flushing daily statistics"
        );
        if self.reset_alerts_on_close {
            self.tracker.reset();
        }
        Some(self.stats.flush_report())
    }

    pub fn flush_report(&mut self) -> String {
        self.stats.flush_report()
    }

    pub fn reset_alerts(&mut self) {
        self.tracker.reset();
    }
}
