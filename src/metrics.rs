//! Prometheus counters for the monitor loop.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub evaluations_total: IntCounter,
    pub instruments_skipped_total: IntCounterVec,
    pub alerts_emitted_total: IntCounterVec,
    pub notifications_failed_total: IntCounter,
    pub reports_flushed_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let evaluations_total = IntCounter::new(
            "evaluations_total",
            "Series evaluated by the signal engine",
        )?;
        let instruments_skipped_total = IntCounterVec::new(
            Opts::new(
                "instruments_skipped_total",
                "Series skipped in a polling iteration",
            ),
            &["reason"],
        )?;
        let alerts_emitted_total = IntCounterVec::new(
            Opts::new("alerts_emitted_total", "Deduplicated alerts emitted"),
            &["direction"],
        )?;
        let notifications_failed_total = IntCounter::new(
            "notifications_failed_total",
            "Notifications that exhausted their retries",
        )?;
        let reports_flushed_total = IntCounter::new(
            "reports_flushed_total",
            "Daily statistics reports flushed",
        )?;

        registry.register(Box::new(evaluations_total.clone()))?;
        registry.register(Box::new(instruments_skipped_total.clone()))?;
        registry.register(Box::new(alerts_emitted_total.clone()))?;
        registry.register(Box::new(notifications_failed_total.clone()))?;
        registry.register(Box::new(reports_flushed_total.clone()))?;

        Ok(Self {
            registry,
            evaluations_total,
            instruments_skipped_total,
            alerts_emitted_total,
            notifications_failed_total,
            reports_flushed_total,
        })
    }

    /// Text exposition format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
