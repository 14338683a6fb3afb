//! SuperTrend / EMA crossing alerts.
//!
//! Indicator engines, crossing confirmation and per-series alert dedup for a
//! set of monitored instruments. Bar acquisition and notification channels are
//! pluggable services; the polling loop in [`core::runtime`] ties them together.

pub mod alerts;
pub mod common;
pub mod config;
pub mod core;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
