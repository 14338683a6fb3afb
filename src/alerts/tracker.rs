//! Per-series alert memory

use std::collections::HashMap;

use tracing::debug;

use crate::models::signal::{AlertKey, Direction};

/// Remembers the last confirmed direction reported for each (instrument,
/// timeframe) so that an unchanged state is reported only once.
///
/// The stored direction never falls back to `Neutral` on its own; only
/// [`AlertStateTracker::reset`] re-arms emission.
#[derive(Debug, Clone, Default)]
pub struct AlertStateTracker {
    states: HashMap<AlertKey, Direction>,
}

impl AlertStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the observation should be emitted, updating the
    /// stored direction in the same step.
    pub fn observe(&mut self, key: &AlertKey, direction: Direction, confirmed: bool) -> bool {
        let stored = self
            .states
            .entry(key.clone())
            .or_insert(Direction::Neutral);

        if !confirmed || direction.is_neutral() || direction == *stored {
            return false;
        }

        debug!(key = %key, from = %stored, to = %direction, "alert state changed");
        *stored = direction;
        true
    }

    pub fn last_direction(&self, key: &AlertKey) -> Direction {
        self.states.get(key).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Forget every stored direction (session boundary).
    pub fn reset(&mut self) {
        self.states.clear();
    }
}
