//! Polling loop that drives a monitoring session.
//!
//! One iteration: enumerate instruments, drop excluded ones, fetch bars per
//! timeframe, evaluate, dedup, print and dispatch alerts. Notification
//! delivery runs on spawned tasks so a slow channel never stalls detection.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::alerts::{render_alert, render_report};
use crate::core::session::MonitorSession;
use crate::indicators::IndicatorError;
use crate::metrics::Metrics;
use crate::models::signal::{Alert, AlertKey};
use crate::services::{
    deliver, DeliveryOutcome, ExclusionFilter, MarketDataProvider, Notifier, RetryPolicy,
};

/// Configuration for the polling loop
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub instrument_pattern: String,
    pub timeframes: Vec<u64>,
    pub min_bars: usize,
    pub poll_interval: Duration,
    pub exclusions: ExclusionFilter,
    pub retry: RetryPolicy,
    pub timezone: Tz,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            instrument_pattern: String::new(),
            timeframes: vec![60],
            min_bars: 250,
            poll_interval: Duration::from_secs(5),
            exclusions: ExclusionFilter::default(),
            retry: RetryPolicy::default(),
            timezone: chrono_tz::Asia::Shanghai,
        }
    }
}

/// What one polling iteration did
#[derive(Debug, Clone, Default)]
pub struct CycleSummary {
    pub instruments: usize,
    pub excluded: usize,
    pub evaluated: usize,
    pub skipped: usize,
    pub alerts: Vec<Alert>,
    pub report: Option<String>,
}

pub struct MonitorRuntime {
    config: RuntimeConfig,
    provider: Arc<dyn MarketDataProvider>,
    notifier: Arc<dyn Notifier>,
    session: MonitorSession,
    metrics: Option<Arc<Metrics>>,
    deliveries: JoinSet<DeliveryOutcome>,
}

impl MonitorRuntime {
    pub fn new(
        config: RuntimeConfig,
        session: MonitorSession,
        provider: Arc<dyn MarketDataProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            provider,
            notifier,
            session,
            metrics: None,
            deliveries: JoinSet::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn session(&self) -> &MonitorSession {
        &self.session
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn pending_deliveries(&self) -> usize {
        self.deliveries.len()
    }

    /// Poll until `stop` turns true, then shut down.
    pub async fn run(&mut self, mut stop: watch::Receiver<bool>) {
        info!(
            pattern = %self.config.instrument_pattern,
            timeframes = ?self.config.timeframes,
            interval_ms = self.config.poll_interval.as_millis() as u64,
            "monitor loop started"
        );
        loop {
            if *stop.borrow() {
                break;
            }
            let summary = self.run_cycle_at(Utc::now()).await;
            debug!(
                instruments = summary.instruments,
                evaluated = summary.evaluated,
                skipped = summary.skipped,
                alerts = summary.alerts.len(),
                "polling iteration finished"
            );

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }
        info!("stop signal received");
        self.shutdown(Utc::now()).await;
    }

    /// One polling iteration at wall-clock time `now`.
    pub async fn run_cycle_at(&mut self, now: DateTime<Utc>) -> CycleSummary {
        let mut summary = CycleSummary::default();

        let instruments = match self
            .provider
            .list_active_instruments(&self.config.instrument_pattern)
            .await
        {
            Ok(instruments) => instruments,
            Err(e) => {
                warn!(error = %e, "instrument enumeration failed, retrying next iteration");
                BTreeSet::new()
            }
        };
        summary.instruments = instruments.len();

        for instrument in &instruments {
            if self.config.exclusions.is_excluded(instrument) {
                debug!(instrument = %instrument, "excluded instrument skipped");
                summary.excluded += 1;
                self.count_skip("excluded");
                continue;
            }
            for timeframe in self.config.timeframes.clone() {
                let key = AlertKey::new(instrument.as_str(), timeframe);
                match self.evaluate_series(&key).await {
                    Ok(Some(alert)) => {
                        summary.evaluated += 1;
                        self.emit(&alert);
                        summary.alerts.push(alert);
                    }
                    Ok(None) => summary.evaluated += 1,
                    Err(reason) => {
                        summary.skipped += 1;
                        self.count_skip(reason);
                    }
                }
            }
        }

        self.reap_deliveries();

        if let Some(body) = self.session.check_session(now) {
            let text = render_report(now, self.config.timezone, &body);
            self.publish_report(text.clone());
            summary.report = Some(text);
        }

        summary
    }

    /// Flush a final report (if anything was counted) and wait for pending deliveries.
    pub async fn shutdown(&mut self, now: DateTime<Utc>) -> Option<String> {
        let report = if self.session.stats().is_empty() {
            None
        } else {
            let body = self.session.flush_report();
            let text = render_report(now, self.config.timezone, &body);
            self.publish_report(text.clone());
            Some(text)
        };
        let outcomes = self.drain_deliveries().await;
        info!(
            delivered = outcomes.iter().filter(|o| o.is_delivered()).count(),
            failed = outcomes.iter().filter(|o| !o.is_delivered()).count(),
            "monitor shut down"
        );
        report
    }

    /// Wait for every in-flight delivery and return their outcomes.
    pub async fn drain_deliveries(&mut self) -> Vec<DeliveryOutcome> {
        let mut outcomes = Vec::new();
        while let Some(joined) = self.deliveries.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => error!(error = %e, "delivery task aborted"),
            }
        }
        outcomes
    }

    async fn evaluate_series(&mut self, key: &AlertKey) -> Result<Option<Alert>, &'static str> {
        let series = match self
            .provider
            .fetch_bars(&key.instrument, key.timeframe_secs, self.config.min_bars)
            .await
        {
            Ok(series) => series,
            Err(e) => {
                warn!(key = %key, error = %e, "bars unavailable, retrying next iteration");
                return Err("data_unavailable");
            }
        };

        let result = self.session.process(key, &series.bars);
        if let Some(metrics) = &self.metrics {
            metrics.evaluations_total.inc();
        }
        match result {
            Ok(alert) => Ok(alert),
            Err(IndicatorError::InsufficientData {
                required,
                available,
            }) => {
                debug!(key = %key, required, available, "not enough bars yet");
                Err("insufficient_data")
            }
            Err(e) => {
                warn!(key = %key, error = %e, "indicator evaluation failed");
                Err("indicator_error")
            }
        }
    }

    fn emit(&mut self, alert: &Alert) {
        let text = render_alert(alert, self.config.timezone);
        println!("{}", text);
        info!(
            instrument = %alert.key.instrument,
            timeframe = alert.key.timeframe_secs,
            direction = %alert.direction,
            status = %alert.status,
            price = alert.price,
            "alert emitted"
        );
        if let Some(metrics) = &self.metrics {
            metrics
                .alerts_emitted_total
                .with_label_values(&[&alert.direction.to_string()])
                .inc();
        }
        self.dispatch(text);
    }

    fn publish_report(&mut self, text: String) {
        println!("{}", text);
        if let Some(metrics) = &self.metrics {
            metrics.reports_flushed_total.inc();
        }
        self.dispatch(text);
    }

    fn dispatch(&mut self, text: String) {
        let notifier = self.notifier.clone();
        let retry = self.config.retry;
        let metrics = self.metrics.clone();
        self.deliveries.spawn(async move {
            let outcome = deliver(notifier.as_ref(), &text, &retry).await;
            if let DeliveryOutcome::Failed { attempts, reason } = &outcome {
                error!(
                    channel = notifier.name(),
                    attempts = *attempts,
                    reason = %reason,
                    "notification dropped after retries"
                );
                if let Some(metrics) = &metrics {
                    metrics.notifications_failed_total.inc();
                }
            }
            outcome
        });
    }

    fn reap_deliveries(&mut self) {
        while let Some(joined) = self.deliveries.try_join_next() {
            if let Err(e) = joined {
                error!(error = %e, "delivery task aborted");
            }
        }
    }

    fn count_skip(&self, reason: &str) {
        if let Some(metrics) = &self.metrics {
            metrics
                .instruments_skipped_total
                .with_label_values(&[reason])
                .inc();
        }
    }
}
