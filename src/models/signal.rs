use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a crossing or trend flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    #[default]
    Neutral,
}

impl Direction {
    pub fn sign(self) -> i8 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
            Direction::Neutral => 0,
        }
    }

    pub fn is_neutral(self) -> bool {
        self == Direction::Neutral
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Neutral => "neutral",
        };
        f.write_str(label)
    }
}

/// Result of one crossing check. Computed fresh every cycle, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossingEvent {
    pub direction: Direction,
    pub confirmed: bool,
    pub price: f64,
    pub reference: f64,
}

impl CrossingEvent {
    pub fn none(price: f64, reference: f64) -> Self {
        Self {
            direction: Direction::Neutral,
            confirmed: false,
            price,
            reference,
        }
    }

    pub fn is_tentative(&self) -> bool {
        !self.confirmed && !self.direction.is_neutral()
    }

    /// Direction if confirmed, `Neutral` otherwise
    pub fn confirmed_direction(&self) -> Direction {
        if self.confirmed {
            self.direction
        } else {
            Direction::Neutral
        }
    }
}

/// What a strategy produced for the latest bar of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvaluation {
    pub event: CrossingEvent,
    /// Reference line value shown in alerts (EMA or SuperTrend line), if the strategy has one
    pub reference: Option<f64>,
    pub bar_time: DateTime<Utc>,
}

/// Identifies one monitored series: an instrument at one timeframe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlertKey {
    pub instrument: String,
    pub timeframe_secs: u64,
}

impl AlertKey {
    pub fn new(instrument: impl Into<String>, timeframe_secs: u64) -> Self {
        Self {
            instrument: instrument.into(),
            timeframe_secs,
        }
    }
}

impl fmt::Display for AlertKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}s", self.instrument, self.timeframe_secs)
    }
}

/// A confirmed, deduplicated signal ready for rendering and delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub key: AlertKey,
    pub direction: Direction,
    pub status: String,
    pub price: f64,
    pub reference: Option<f64>,
    pub reference_label: Option<String>,
    pub bar_time: DateTime<Utc>,
}
