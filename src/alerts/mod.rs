//! Alert deduplication, daily statistics and console text rendering.

pub mod format;
pub mod session;
pub mod stats;
pub mod tracker;

pub use format::*;
pub use session::SessionBoundary;
pub use stats::{DailyStatsAggregator, SignalCounts};
pub use tracker::AlertStateTracker;
