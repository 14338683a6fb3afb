//! Small numeric building blocks for the indicators.

use std::collections::VecDeque;

/// True range of a bar.
///
/// Without a previous close (first bar of a series) this is just `high - low`.
pub fn true_range(high: f64, low: f64, prev_close: Option<f64>) -> f64 {
    let range = high - low;
    match prev_close {
        Some(prev) => range.max((high - prev).abs()).max((low - prev).abs()),
        None => range,
    }
}

/// Smoothing factor of an exponential moving average (`adjust=false` form).
pub fn ema_alpha(period: u32) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// One step of the recursive EMA: `alpha * value + (1 - alpha) * prev`.
pub fn ema_step(prev: f64, value: f64, alpha: f64) -> f64 {
    alpha * value + (1.0 - alpha) * prev
}

/// Simple moving average over the last `period` values
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let tail = &values[values.len() - period..];
    Some(tail.iter().sum::<f64>() / period as f64)
}

/// Fixed-size rolling mean that updates in constant time.
#[derive(Debug, Clone)]
pub struct RollingMean {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
}

impl RollingMean {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            window: VecDeque::with_capacity(period),
            sum: 0.0,
        }
    }

    /// Push a value and return the mean once the window is full.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        self.window.push_back(value);
        self.sum += value;
        if self.window.len() > self.period {
            if let Some(old) = self.window.pop_front() {
                self.sum -= old;
            }
        }
        self.mean()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.period == 0 || self.window.len() < self.period {
            None
        } else {
            Some(self.sum / self.period as f64)
        }
    }
}
