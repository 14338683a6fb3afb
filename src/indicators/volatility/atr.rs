//! ATR (Average True Range) indicator

use crate::common::math::{self, RollingMean};
use crate::indicators::IndicatorError;
use crate::models::indicators::Bar;

/// Incremental ATR: simple moving average of the true range over `period` bars.
///
/// The first bar has no previous close, so its true range is `high - low`.
/// The value is defined from the `period`-th bar on.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    prev_close: Option<f64>,
    window: RollingMean,
}

impl Atr {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "ATR period must be positive".to_string(),
            ));
        }
        Ok(Self {
            period,
            prev_close: None,
            window: RollingMean::new(period),
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn next(&mut self, bar: &Bar) -> Option<f64> {
        let tr = math::true_range(bar.high, bar.low, self.prev_close);
        self.prev_close = Some(bar.close);
        self.window.push(tr)
    }

    pub fn value(&self) -> Option<f64> {
        self.window.mean()
    }
}

/// ATR values for every bar from index `period - 1` on
pub fn calculate_atr(bars: &[Bar], period: usize) -> Result<Vec<f64>, IndicatorError> {
    let mut atr = Atr::new(period)?;
    IndicatorError::require(period, bars.len())?;
    Ok(bars.iter().filter_map(|bar| atr.next(bar)).collect())
}
