//! All-lines crossing aggregation over a set of reference lines

use crate::models::signal::Direction;
use crate::signals::crossing::CrossingDetector;

/// Outcome of checking a close series against every line of a basket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateCrossing {
    pub direction: Direction,
    pub all_crossed: bool,
    /// Lines reporting a confirmed up-cross
    pub confirmed_up: usize,
    /// Lines reporting a confirmed down-cross
    pub confirmed_down: usize,
    pub lines: usize,
}

impl AggregateCrossing {
    fn none(lines: usize, confirmed_up: usize, confirmed_down: usize) -> Self {
        Self {
            direction: Direction::Neutral,
            all_crossed: false,
            confirmed_up,
            confirmed_down,
            lines,
        }
    }
}

/// Requires every reference line to report a confirmed crossing in the same
/// direction. Partial agreement is no signal at all.
#[derive(Debug, Clone, Copy)]
pub struct AggregateCrossingEvaluator {
    detector: CrossingDetector,
}

impl AggregateCrossingEvaluator {
    pub fn new(detector: CrossingDetector) -> Self {
        Self { detector }
    }

    pub fn detector(&self) -> &CrossingDetector {
        &self.detector
    }

    pub fn evaluate_all<R: AsRef<[f64]>>(&self, closes: &[f64], references: &[R]) -> AggregateCrossing {
        let lines = references.len();
        let mut confirmed_up = 0;
        let mut confirmed_down = 0;
        for line in references {
            match self.detector.detect(closes, line.as_ref()).confirmed_direction() {
                Direction::Up => confirmed_up += 1,
                Direction::Down => confirmed_down += 1,
                Direction::Neutral => {}
            }
        }

        let direction = if lines == 0 {
            Direction::Neutral
        } else if confirmed_up == lines {
            Direction::Up
        } else if confirmed_down == lines {
            Direction::Down
        } else {
            Direction::Neutral
        };

        if direction.is_neutral() {
            return AggregateCrossing::none(lines, confirmed_up, confirmed_down);
        }
        AggregateCrossing {
            direction,
            all_crossed: true,
            confirmed_up,
            confirmed_down,
            lines,
        }
    }
}
