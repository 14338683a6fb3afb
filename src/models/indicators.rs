use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLC price bar. Bars are immutable once produced by the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(open: f64, high: f64, low: f64, close: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }

    /// Midpoint of the bar's range, `(high + low) / 2`.
    pub fn hl2(&self) -> f64 {
        (self.high + self.low) / 2.0
    }
}

/// Ordered bars of one instrument at one sampling duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarSeries {
    pub instrument: String,
    pub timeframe_secs: u64,
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(instrument: impl Into<String>, timeframe_secs: u64, bars: Vec<Bar>) -> Self {
        Self {
            instrument: instrument.into(),
            timeframe_secs,
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

/// SuperTrend direction. There is no neutral state: the sign is sticky.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn sign(self) -> i8 {
        match self {
            Trend::Up => 1,
            Trend::Down => -1,
        }
    }
}

/// SuperTrend output for a single bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendState {
    /// Final lower band (support while trending up)
    pub up_band: f64,
    /// Final upper band (resistance while trending down)
    pub down_band: f64,
    pub trend: Trend,
    /// `up_band` when trending up, `down_band` otherwise
    pub value: f64,
    pub atr: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmaValue {
    pub period: u32,
    pub value: f64,
}
