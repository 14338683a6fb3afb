//! Integration tests for the monitor loop
//!
//! Drives `MonitorRuntime` against an in-memory bar source and a recording
//! notifier, one polling iteration at a time.


use std::sync::Arc;
use std::time::Duration;

use atralert::alerts::SessionBoundary;
use atralert::core::{MonitorRuntime, MonitorSession};
use atralert::metrics::Metrics;
use atralert::models::indicators::BarSeries;
use atralert::models::signal::Direction;
use atralert::models::strategy::{MonitorStrategy, StrategyConfig};
use atralert::services::{DeliveryOutcome, MarketDataProvider, ReplayMarketDataProvider};
use tokio::sync::watch;

use test_utils::{
    after_close, bar, crossing_bars, morning, runtime_config, RecordingNotifier, TestMonitor,
    INSTRUMENT,
};

#[tokio::test]
async fn alert_emitted_once_confirmed_and_deduplicated() {
    let mut monitor = TestMonitor::new("", RecordingNotifier::default());
    monitor.provider.set_bars(INSTRUMENT, 60, crossing_bars()).await;

    // Cross on the last bar is still tentative under three-bar confirmation
    let first = monitor.runtime.run_cycle_at(morning()).await;
    assert_eq!(first.instruments, 1);
    assert_eq!(first.evaluated, 1);
    assert!(first.alerts.is_empty());

    monitor.provider.push_bar(INSTRUMENT, 60, bar(12, 112.0)).await;
    let second = monitor.runtime.run_cycle_at(morning()).await;
    assert_eq!(second.alerts.len(), 1);
    let alert = &second.alerts[0];
    assert_eq!(alert.direction, Direction::Up);
    assert_eq!(alert.status, "上穿EMA3");
    assert_eq!(alert.price, 112.0);
    assert_eq!(alert.reference, Some(107.25));
    assert_eq!(alert.reference_label.as_deref(), Some("EMA3"));

    // Still above the line: nothing new to report
    monitor.provider.push_bar(INSTRUMENT, 60, bar(13, 113.0)).await;
    let third = monitor.runtime.run_cycle_at(morning()).await;
    assert!(third.alerts.is_empty());

    let outcomes = monitor.runtime.drain_deliveries().await;
    assert_eq!(outcomes, vec![DeliveryOutcome::Delivered { attempts: 1 }]);

    let messages = monitor.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0],
        "[2024-03-15 09:12:00]\n合约: SHFE.ni2405\n状态: 上穿EMA3\n当前价: 112.00\nEMA3: 107.25"
    );
    assert_eq!(monitor.runtime.session().stats().counts(INSTRUMENT).up, 1);
}

#[tokio::test]
async fn excluded_instruments_are_skipped() {
    let mut monitor = TestMonitor::new("SSE", RecordingNotifier::default());
    let mut bars = crossing_bars();
    bars.push(bar(12, 112.0));
    monitor.provider.set_bars(INSTRUMENT, 60, bars.clone()).await;
    monitor.provider.set_bars("SSE.510050", 60, bars).await;

    let summary = monitor.runtime.run_cycle_at(morning()).await;
    assert_eq!(summary.instruments, 2);
    assert_eq!(summary.excluded, 1);
    assert_eq!(summary.evaluated, 1);
    assert_eq!(summary.alerts.len(), 1);
    assert_eq!(summary.alerts[0].key.instrument, INSTRUMENT);
    assert_eq!(
        monitor.runtime.session().stats().counts("SSE.510050").total(),
        0
    );
}

#[tokio::test]
async fn unavailable_series_does_not_abort_iteration() {
    let mut monitor = TestMonitor::new("", RecordingNotifier::default());
    let mut bars = crossing_bars();
    bars.push(bar(12, 112.0));
    monitor.provider.set_bars(INSTRUMENT, 60, bars).await;
    monitor
        .provider
        .set_bars("DCE.m2409", 60, vec![bar(0, 1.0), bar(1, 2.0)])
        .await;

    let summary = monitor.runtime.run_cycle_at(morning()).await;
    assert_eq!(summary.instruments, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.evaluated, 1);
    assert_eq!(summary.alerts.len(), 1);
}

#[tokio::test]
async fn daily_report_flushed_once_at_session_close() {
    let mut monitor = TestMonitor::new("", RecordingNotifier::default());
    let mut bars = crossing_bars();
    bars.push(bar(12, 112.0));
    monitor.provider.set_bars(INSTRUMENT, 60, bars).await;

    let morning_cycle = monitor.runtime.run_cycle_at(morning()).await;
    assert_eq!(morning_cycle.alerts.len(), 1);
    assert!(morning_cycle.report.is_none());

    let close_cycle = monitor.runtime.run_cycle_at(after_close()).await;
    let report = close_cycle.report.expect("report at session close");
    assert_eq!(
        report,
        "[2024-03-15 15:30:00]\n每日信号统计\n合约: SHFE.ni2405 上穿: 1 下穿: 0\n合计: 上穿 1 下穿 0 总计 1"
    );
    assert!(monitor.runtime.session().stats().is_empty());

    let later = monitor.runtime.run_cycle_at(after_close()).await;
    assert!(later.report.is_none());

    monitor.runtime.drain_deliveries().await;
    let messages = monitor.notifier.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1], report);
}

#[tokio::test]
async fn session_close_can_rearm_alerts() {
    let provider = Arc::new(atralert::services::InMemoryMarketDataProvider::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let strategy = StrategyConfig::new(MonitorStrategy::SingleEma { period: 3 });
    let session = MonitorSession::new(strategy, SessionBoundary::default())
        .with_alert_reset_on_close(true);
    let mut runtime = MonitorRuntime::new(
        runtime_config(""),
        session,
        provider.clone(),
        notifier.clone(),
    );

    let mut bars = crossing_bars();
    bars.push(bar(12, 112.0));
    provider.set_bars(INSTRUMENT, 60, bars).await;

    assert_eq!(runtime.run_cycle_at(morning()).await.alerts.len(), 1);
    let close_cycle = runtime.run_cycle_at(after_close()).await;
    assert!(close_cycle.report.is_some());
    assert!(runtime.session().tracker().is_empty());

    // The unchanged confirmed state is reported again in the new session
    let next = runtime.run_cycle_at(after_close()).await;
    assert_eq!(next.alerts.len(), 1);
}

#[tokio::test]
async fn failed_delivery_is_counted_not_fatal() {
    let monitor = TestMonitor::new("", RecordingNotifier::failing());
    let metrics = Arc::new(Metrics::new().expect("metrics registry"));
    let mut runtime = monitor.runtime.with_metrics(metrics.clone());

    let mut bars = crossing_bars();
    bars.push(bar(12, 112.0));
    monitor.provider.set_bars(INSTRUMENT, 60, bars).await;

    let summary = runtime.run_cycle_at(morning()).await;
    assert_eq!(summary.alerts.len(), 1);

    let outcomes = runtime.drain_deliveries().await;
    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].is_delivered());
    assert_eq!(outcomes[0].attempts(), 2);
    assert_eq!(monitor.notifier.attempts(), 2);

    // Detection state is unaffected by the delivery failure
    assert_eq!(runtime.session().stats().counts(INSTRUMENT).up, 1);
    assert_eq!(metrics.notifications_failed_total.get(), 1);
    assert_eq!(metrics.alerts_emitted_total.with_label_values(&["up"]).get(), 1);
    assert_eq!(metrics.evaluations_total.get(), 1);

    let exported = metrics.export().expect("metrics export");
    assert!(exported.contains("notifications_failed_total 1"));
}

#[tokio::test]
async fn shutdown_flushes_final_report() {
    let mut monitor = TestMonitor::new("", RecordingNotifier::default());
    let mut bars = crossing_bars();
    bars.push(bar(12, 112.0));
    monitor.provider.set_bars(INSTRUMENT, 60, bars).await;

    monitor.runtime.run_cycle_at(morning()).await;
    let report = monitor
        .runtime
        .shutdown(morning())
        .await
        .expect("final report");
    assert!(report.contains("合约: SHFE.ni2405 上穿: 1 下穿: 0"));
    assert_eq!(monitor.runtime.pending_deliveries(), 0);
    assert_eq!(monitor.notifier.messages().len(), 2);

    // Nothing counted since the last flush
    assert!(monitor.runtime.shutdown(morning()).await.is_none());
}

#[tokio::test]
async fn run_loop_stops_on_signal() {
    let mut monitor = TestMonitor::new("", RecordingNotifier::default());
    let mut bars = crossing_bars();
    bars.push(bar(12, 112.0));
    monitor.provider.set_bars(INSTRUMENT, 60, bars).await;

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let _ = stop_tx.send(true);
    });

    tokio::time::timeout(Duration::from_secs(5), monitor.runtime.run(stop_rx))
        .await
        .expect("monitor loop should stop");

    assert_eq!(monitor.runtime.pending_deliveries(), 0);
    assert!(monitor
        .notifier
        .messages()
        .iter()
        .any(|m| m.contains("状态: 上穿EMA3")));
}

#[tokio::test]
async fn replay_file_drives_the_monitor() {
    let mut bars = crossing_bars();
    bars.push(bar(12, 112.0));
    let series = vec![BarSeries::new(INSTRUMENT, 60, bars)];
    let path = std::env::temp_dir().join(format!("atralert-replay-{}.json", std::process::id()));
    std::fs::write(&path, serde_json::to_string(&series).expect("serialize bars"))
        .expect("write replay file");

    let provider = Arc::new(
        ReplayMarketDataProvider::from_file(&path, 11)
            .await
            .expect("load replay file"),
    );
    let _ = std::fs::remove_file(&path);
    assert_eq!(provider.cursor(), 11);

    let notifier = Arc::new(RecordingNotifier::default());
    let strategy = StrategyConfig::new(MonitorStrategy::SingleEma { period: 3 });
    let mut runtime = MonitorRuntime::new(
        runtime_config(""),
        MonitorSession::new(strategy, SessionBoundary::default()),
        provider.clone(),
        notifier.clone(),
    );

    // Bar 12 (tentative cross) then bar 13 (confirmed)
    assert!(runtime.run_cycle_at(morning()).await.alerts.is_empty());
    assert_eq!(runtime.run_cycle_at(morning()).await.alerts.len(), 1);
    assert!(provider.is_exhausted());

    let listed = provider
        .list_active_instruments("SHFE")
        .await
        .expect("list instruments");
    assert!(listed.contains(INSTRUMENT));
}
