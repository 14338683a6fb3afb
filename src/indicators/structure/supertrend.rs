//! SuperTrend indicator
//!
//! Volatility bands around the bar midpoint, scaled by ATR. The lower band
//! (`up_band`) only ratchets upward and the upper band (`down_band`) only
//! ratchets downward until the previous close breaks through them; the trend
//! sign flips when the close breaches the opposite band of the previous bar.

use crate::indicators::volatility::Atr;
use crate::indicators::IndicatorError;
use crate::models::indicators::{Bar, Trend, TrendState};
use crate::models::signal::Direction;

/// Incremental SuperTrend engine.
///
/// Keeps only the ATR window and the previous bar's state, so each update is O(1).
#[derive(Debug, Clone)]
pub struct SuperTrend {
    multiplier: f64,
    atr: Atr,
    prev: Option<(TrendState, f64)>,
}

impl SuperTrend {
    pub fn new(period: usize, multiplier: f64) -> Result<Self, IndicatorError> {
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(IndicatorError::InvalidParameter(format!(
                "SuperTrend multiplier must be a non-negative number, got {}",
                multiplier
            )));
        }
        Ok(Self {
            multiplier,
            atr: Atr::new(period)?,
            prev: None,
        })
    }

    pub fn period(&self) -> usize {
        self.atr.period()
    }

    /// Feed one bar. Returns `None` while ATR is still warming up.
    pub fn next(&mut self, bar: &Bar) -> Option<TrendState> {
        let atr = self.atr.next(bar)?;
        let mid = bar.hl2();
        let up_basic = mid - self.multiplier * atr;
        let down_basic = mid + self.multiplier * atr;

        let (up_band, down_band, trend) = match self.prev {
            None => {
                let trend = if bar.close > down_basic {
                    Trend::Up
                } else {
                    Trend::Down
                };
                (up_basic, down_basic, trend)
            }
            Some((prev, prev_close)) => {
                let up_band = if up_basic > prev.up_band || prev_close < prev.up_band {
                    up_basic
                } else {
                    prev.up_band
                };
                let down_band = if down_basic < prev.down_band || prev_close > prev.down_band {
                    down_basic
                } else {
                    prev.down_band
                };
                let trend = if bar.close > prev.down_band {
                    Trend::Up
                } else if bar.close < prev.up_band {
                    Trend::Down
                } else {
                    prev.trend
                };
                (up_band, down_band, trend)
            }
        };

        let value = match trend {
            Trend::Up => up_band,
            Trend::Down => down_band,
        };
        let state = TrendState {
            up_band,
            down_band,
            trend,
            value,
            atr,
        };
        self.prev = Some((state, bar.close));
        Some(state)
    }

    pub fn last(&self) -> Option<TrendState> {
        self.prev.map(|(state, _)| state)
    }
}

/// SuperTrend states for every bar with a defined ATR.
///
/// The first state belongs to bar `period - 1`; fails when fewer than
/// `period` bars are given.
pub fn compute_supertrend(
    bars: &[Bar],
    period: usize,
    multiplier: f64,
) -> Result<Vec<TrendState>, IndicatorError> {
    let mut engine = SuperTrend::new(period, multiplier)?;
    IndicatorError::require(period, bars.len())?;
    Ok(bars.iter().filter_map(|bar| engine.next(bar)).collect())
}

/// Edge event between two consecutive states: `Up` on a flip to an uptrend (buy),
/// `Down` on a flip to a downtrend (sell).
pub fn trend_flip(prev: &TrendState, curr: &TrendState) -> Direction {
    match (prev.trend, curr.trend) {
        (Trend::Down, Trend::Up) => Direction::Up,
        (Trend::Up, Trend::Down) => Direction::Down,
        _ => Direction::Neutral,
    }
}

/// Flip at the most recent state of a series
pub fn latest_flip(states: &[TrendState]) -> Direction {
    match states {
        [.., prev, curr] => trend_flip(prev, curr),
        _ => Direction::Neutral,
    }
}
