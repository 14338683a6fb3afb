//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod signal;
pub mod strategy;

pub use indicators::{Bar, BarSeries, EmaValue, Trend, TrendState};
pub use signal::{Alert, AlertKey, CrossingEvent, Direction, SignalEvaluation};
pub use strategy::{ConfirmationDepth, MonitorStrategy, StrategyConfig};
