//! Indicator engines. Each engine is incremental (one bar in, one value out)
//! and has a batch form that folds it over a whole series.

pub mod error;

pub mod structure;
pub mod trend;
pub mod volatility;

pub use error::IndicatorError;
