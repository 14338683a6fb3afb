//! Atralert Worker
//!
//! Replays bars from `BARS_FILE` through the monitor loop and sends alerts to
//! the configured webhook (or the log when none is set).

use std::sync::Arc;
use std::time::Duration;

use atralert::config::{self, MonitorConfig};
use atralert::core::{MonitorRuntime, MonitorSession, RuntimeConfig};
use atralert::logging;
use atralert::metrics::Metrics;
use atralert::services::{
    LogNotifier, MarketDataProvider, Notifier, ReplayMarketDataProvider, WebhookNotifier,
};
use dotenvy::dotenv;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = MonitorConfig::from_env()?;
    info!(environment = %config::get_environment(), "Starting Atralert Worker");
    info!(strategy = ?config.strategy, "Strategy");

    let bars_file = config
        .bars_file
        .clone()
        .ok_or("BARS_FILE must point to a replay file for the worker")?;
    let provider = Arc::new(ReplayMarketDataProvider::from_file(&bars_file, config.min_bars).await?);

    let notifier: Arc<dyn Notifier> = match &config.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone())?),
        None => {
            warn!("NOTIFY_WEBHOOK_URL not set, notifications go to the log only");
            Arc::new(LogNotifier)
        }
    };

    let metrics = Arc::new(Metrics::new()?);
    let session = MonitorSession::new(config.strategy.clone(), config.session_boundary())
        .with_alert_reset_on_close(config.reset_alerts_on_session_close);
    let runtime_config = RuntimeConfig {
        instrument_pattern: config.instrument_pattern.clone(),
        timeframes: config.timeframes.clone(),
        min_bars: config.min_bars,
        poll_interval: config.poll_interval,
        exclusions: config.exclusions.clone(),
        retry: config.retry,
        timezone: config.timezone,
    };
    let data: Arc<dyn MarketDataProvider> = provider.clone();
    let mut runtime =
        MonitorRuntime::new(runtime_config, session, data, notifier).with_metrics(metrics.clone());

    let (stop_tx, stop_rx) = watch::channel(false);
    let watcher = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = signal::ctrl_c() => {
                    info!("Shutting down worker...");
                    break;
                }
                _ = tokio::time::sleep(Duration::from_secs(1)) => {
                    if provider.is_exhausted() {
                        info!("Replay finished");
                        break;
                    }
                }
            }
        }
        let _ = stop_tx.send(true);
    });

    runtime.run(stop_rx).await;
    watcher.abort();

    info!(metrics = %metrics.export()?, "Worker stopped");
    Ok(())
}
