//! Crossing detection and strategy evaluation.

pub mod aggregation;
pub mod crossing;
pub mod engine;
pub mod stream;

pub use aggregation::*;
pub use crossing::*;
pub use engine::SignalEngine;
pub use stream::StreamingEvaluator;
