//! Environment-driven configuration.
//!
//! Values come from the process environment (a `.env` file is loaded first by
//! the binaries). Every key has a default except the replay file path.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveTime;
use chrono_tz::Tz;
use thiserror::Error;

use crate::alerts::SessionBoundary;
use crate::models::strategy::{
    default_basket_periods, ConfirmationDepth, MonitorStrategy, StrategyConfig,
};
use crate::services::{ExclusionFilter, RetryPolicy};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Deployment environment from `APP_ENV` (defaults to `sandbox`)
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub instrument_pattern: String,
    pub exclusions: ExclusionFilter,
    pub timeframes: Vec<u64>,
    pub strategy: StrategyConfig,
    pub min_bars: usize,
    pub poll_interval: Duration,
    pub session_close: NaiveTime,
    pub timezone: Tz,
    pub reset_alerts_on_session_close: bool,
    pub webhook_url: Option<String>,
    pub retry: RetryPolicy,
    pub bars_file: Option<String>,
}

impl MonitorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let strategy = match get("STRATEGY").as_deref().unwrap_or("supertrend") {
            "supertrend" => MonitorStrategy::SuperTrend {
                period: parse_or(&get, "SUPERTREND_PERIOD", 10)?,
                multiplier: parse_or(&get, "SUPERTREND_MULTIPLIER", 3.0)?,
            },
            "ema" => MonitorStrategy::SingleEma {
                period: parse_or(&get, "EMA_PERIOD", 200)?,
            },
            "ema_basket" => MonitorStrategy::EmaBasket {
                periods: match get("EMA_BASKET_PERIODS") {
                    Some(raw) => parse_list("EMA_BASKET_PERIODS", &raw)?,
                    None => default_basket_periods(),
                },
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "STRATEGY",
                    value: other.to_string(),
                    reason: "expected supertrend, ema or ema_basket".to_string(),
                })
            }
        };

        let confirmation_bars: usize = parse_or(&get, "CONFIRMATION_BARS", 3)?;
        let confirmation =
            ConfirmationDepth::from_bars(confirmation_bars).ok_or_else(|| ConfigError::Invalid {
                key: "CONFIRMATION_BARS",
                value: confirmation_bars.to_string(),
                reason: "expected 2 or 3".to_string(),
            })?;
        let window_bars: usize = parse_or(&get, "WINDOW_BARS", 4)?;
        if window_bars < confirmation.bars() {
            return Err(ConfigError::Invalid {
                key: "WINDOW_BARS",
                value: window_bars.to_string(),
                reason: format!("must be at least CONFIRMATION_BARS ({})", confirmation.bars()),
            });
        }

        let timeframes = match get("TIMEFRAMES") {
            Some(raw) => parse_list("TIMEFRAMES", &raw)?,
            None => vec![60],
        };
        if timeframes.is_empty() {
            return Err(ConfigError::Missing("TIMEFRAMES"));
        }

        let session_close = match get("SESSION_CLOSE") {
            Some(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|e| {
                ConfigError::Invalid {
                    key: "SESSION_CLOSE",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => SessionBoundary::default().close(),
        };
        let timezone = match get("SESSION_TZ") {
            Some(raw) => raw.trim().parse::<Tz>().map_err(|e| ConfigError::Invalid {
                key: "SESSION_TZ",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => chrono_tz::Asia::Shanghai,
        };

        let retry = RetryPolicy {
            max_attempts: parse_or(&get, "NOTIFY_MAX_ATTEMPTS", 3)?,
            backoff: Duration::from_millis(parse_or(&get, "NOTIFY_BACKOFF_MS", 2000)?),
        };

        Ok(Self {
            instrument_pattern: get("INSTRUMENT_PATTERN").unwrap_or_default(),
            exclusions: get("EXCLUDE_INSTRUMENTS")
                .map(|raw| ExclusionFilter::parse(&raw))
                .unwrap_or_default(),
            timeframes,
            strategy: StrategyConfig {
                strategy,
                confirmation,
                window_bars,
            },
            min_bars: parse_or(&get, "MIN_BARS", 250)?,
            poll_interval: Duration::from_secs(parse_or(&get, "POLL_INTERVAL_SECONDS", 5)?),
            session_close,
            timezone,
            reset_alerts_on_session_close: parse_or(&get, "RESET_ALERTS_ON_SESSION_CLOSE", false)?,
            webhook_url: get("NOTIFY_WEBHOOK_URL"),
            retry,
            bars_file: get("BARS_FILE"),
        })
    }

    pub fn session_boundary(&self) -> SessionBoundary {
        SessionBoundary::new(self.session_close, self.timezone)
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_list<T>(key: &'static str, raw: &str) -> Result<Vec<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                value: raw.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}
