//! Close-vs-reference crossing detection with configurable confirmation depth.

use crate::models::signal::{CrossingEvent, Direction};
use crate::models::strategy::ConfirmationDepth;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Above,
    Below,
    On,
}

fn side(close: f64, reference: f64) -> Option<Side> {
    if !close.is_finite() || !reference.is_finite() {
        return None;
    }
    Some(if close > reference {
        Side::Above
    } else if close < reference {
        Side::Below
    } else {
        Side::On
    })
}

/// Detects the most recent crossing of a close series over a reference line
/// inside a trailing window.
///
/// A crossing at bar `k` needs bar `k - 1` strictly on one side of the line and
/// every bar from `k` through the last bar strictly on the other. The pattern
/// spans `1 + (last - k + 1)` bars; it is confirmed once that span reaches the
/// confirmation depth and tentative before that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossingDetector {
    window_bars: usize,
    depth: ConfirmationDepth,
}

impl CrossingDetector {
    pub fn new(window_bars: usize, depth: ConfirmationDepth) -> Self {
        Self { window_bars, depth }
    }

    pub fn window_bars(&self) -> usize {
        self.window_bars
    }

    pub fn depth(&self) -> ConfirmationDepth {
        self.depth
    }

    /// `closes` and `reference` are aligned on their last element.
    pub fn detect(&self, closes: &[f64], reference: &[f64]) -> CrossingEvent {
        let price = closes.last().copied().unwrap_or(f64::NAN);
        let reference_value = reference.last().copied().unwrap_or(f64::NAN);
        let none = CrossingEvent::none(price, reference_value);

        let window = self.window_bars;
        if window < 2 || closes.len() < window || reference.len() < window {
            return none;
        }

        let closes = &closes[closes.len() - window..];
        let reference = &reference[reference.len() - window..];
        let sides = match closes
            .iter()
            .zip(reference)
            .map(|(c, r)| side(*c, *r))
            .collect::<Option<Vec<_>>>()
        {
            Some(sides) => sides,
            // Warm-up gaps in the reference line
            None => return none,
        };

        let last = window - 1;
        let current = sides[last];
        let direction = match current {
            Side::Above => Direction::Up,
            Side::Below => Direction::Down,
            Side::On => return none,
        };

        let mut k = last;
        while k > 0 && sides[k - 1] == current {
            k -= 1;
        }
        if k == 0 || sides[k - 1] == Side::On {
            return none;
        }

        let span = 1 + (last - k + 1);
        CrossingEvent {
            direction,
            confirmed: span >= self.depth.bars(),
            price,
            reference: reference_value,
        }
    }
}

/// Convenience wrapper around [`CrossingDetector::detect`]
pub fn detect_crossing(
    closes: &[f64],
    reference: &[f64],
    window_bars: usize,
    depth: ConfirmationDepth,
) -> CrossingEvent {
    CrossingDetector::new(window_bars, depth).detect(closes, reference)
}
