//! Shared numeric helpers used by the indicator engines.

pub mod math;
