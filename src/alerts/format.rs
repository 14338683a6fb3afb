//! Plain-text rendering of alerts and reports.
//!
//! Downstream log consumers parse this layout, keep it stable.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::models::signal::{Alert, Direction};
use crate::models::strategy::MonitorStrategy;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_timestamp(at: DateTime<Utc>, timezone: Tz) -> String {
    at.with_timezone(&timezone).format(TIMESTAMP_FORMAT).to_string()
}

/// Human-readable status for a confirmed signal
pub fn status_label(strategy: &MonitorStrategy, direction: Direction) -> String {
    let up = direction == Direction::Up;
    match strategy {
        MonitorStrategy::SuperTrend { .. } => {
            if up {
                "SuperTrend 买入信号".to_string()
            } else {
                "SuperTrend 卖出信号".to_string()
            }
        }
        MonitorStrategy::SingleEma { period } => {
            format!("{}EMA{}", if up { "上穿" } else { "下穿" }, period)
        }
        MonitorStrategy::EmaBasket { periods } => {
            format!(
                "{}全部{}条EMA",
                if up { "上穿" } else { "下穿" },
                periods.len()
            )
        }
    }
}

/// Label of the reference value line, for strategies that show one
pub fn reference_label(strategy: &MonitorStrategy) -> Option<String> {
    match strategy {
        MonitorStrategy::SuperTrend { .. } => Some("SuperTrend".to_string()),
        MonitorStrategy::SingleEma { period } => Some(format!("EMA{}", period)),
        MonitorStrategy::EmaBasket { .. } => None,
    }
}

pub fn render_alert(alert: &Alert, timezone: Tz) -> String {
    let mut text = format!(
        "[{}]\n合约: {}\n状态: {}\n当前价: {:.2}",
        format_timestamp(alert.bar_time, timezone),
        alert.key.instrument,
        alert.status,
        alert.price
    );
    if let (Some(label), Some(value)) = (&alert.reference_label, alert.reference) {
        text.push_str(&format!("\n{}: {:.2}", label, value));
    }
    text
}

pub fn render_report(at: DateTime<Utc>, timezone: Tz, body: &str) -> String {
    format!("[{}]\n{}", format_timestamp(at, timezone), body)
}
