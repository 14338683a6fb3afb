//! Daily confirmed-signal counts per instrument

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;

use crate::models::signal::Direction;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SignalCounts {
    pub up: u32,
    pub down: u32,
}

impl SignalCounts {
    pub fn total(&self) -> u32 {
        self.up + self.down
    }
}

#[derive(Debug, Clone, Default)]
pub struct DailyStatsAggregator {
    counts: BTreeMap<String, SignalCounts>,
}

impl DailyStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, instrument: &str, direction: Direction) {
        if direction.is_neutral() {
            return;
        }
        let counts = self.counts.entry(instrument.to_string()).or_default();
        match direction {
            Direction::Up => counts.up += 1,
            Direction::Down => counts.down += 1,
            Direction::Neutral => {}
        }
    }

    pub fn counts(&self, instrument: &str) -> SignalCounts {
        self.counts.get(instrument).copied().unwrap_or_default()
    }

    pub fn totals(&self) -> SignalCounts {
        self.counts
            .values()
            .fold(SignalCounts::default(), |acc, c| SignalCounts {
                up: acc.up + c.up,
                down: acc.down + c.down,
            })
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Render the per-instrument counts and totals.
    pub fn render_report(&self) -> String {
        let mut report = String::from("每日信号统计");
        if self.counts.is_empty() {
            report.push_str("\n今日无信号");
        }
        for (instrument, counts) in &self.counts {
            let _ = write!(
                report,
                "\n合约: {} 上穿: {} 下穿: {}",
                instrument, counts.up, counts.down
            );
        }
        let totals = self.totals();
        let _ = write!(
            report,
            "\n合计: 上穿 {} 下穿 {} 总计 {}",
            totals.up,
            totals.down,
            totals.total()
        );
        report
    }

    /// Render the report, then clear every counter.
    pub fn flush_report(&mut self) -> String {
        let report = self.render_report();
        self.counts.clear();
        report
    }
}
