//! EMA (Exponential Moving Average) indicator

use std::collections::BTreeMap;

use crate::common::math;
use crate::indicators::IndicatorError;
use crate::models::indicators::{Bar, EmaValue};

/// Fewest bars an EMA basket is computed from (enough for a three-bar
/// confirmation plus the pre-cross bar).
pub const MIN_EMA_BARS: usize = 4;

/// Recursive EMA seeded with the first value, `alpha = 2 / (period + 1)`.
#[derive(Debug, Clone)]
pub struct Ema {
    period: u32,
    alpha: f64,
    value: Option<f64>,
}

impl Ema {
    pub fn new(period: u32) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "EMA period must be positive".to_string(),
            ));
        }
        Ok(Self {
            period,
            alpha: math::ema_alpha(period),
            value: None,
        })
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    pub fn next(&mut self, value: f64) -> f64 {
        let next = match self.value {
            Some(prev) => math::ema_step(prev, value, self.alpha),
            None => value,
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }
}

/// EMA series over `values`, one output per input
pub fn calculate_ema(values: &[f64], period: u32) -> Result<Vec<f64>, IndicatorError> {
    let mut ema = Ema::new(period)?;
    Ok(values.iter().map(|v| ema.next(*v)).collect())
}

/// A fixed set of EMAs over the same close series.
#[derive(Debug, Clone)]
pub struct EmaBasket {
    emas: Vec<Ema>,
}

impl EmaBasket {
    pub fn new(periods: &[u32]) -> Result<Self, IndicatorError> {
        if periods.is_empty() {
            return Err(IndicatorError::InvalidParameter(
                "EMA basket needs at least one period".to_string(),
            ));
        }
        let mut sorted = periods.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != periods.len() {
            return Err(IndicatorError::InvalidParameter(format!(
                "EMA basket periods must be distinct: {:?}",
                periods
            )));
        }
        let emas = periods
            .iter()
            .map(|&p| Ema::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { emas })
    }

    pub fn len(&self) -> usize {
        self.emas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emas.is_empty()
    }

    pub fn periods(&self) -> Vec<u32> {
        self.emas.iter().map(Ema::period).collect()
    }

    /// Feed one close into every EMA, returning the new values in period order.
    pub fn next(&mut self, close: f64) -> Vec<EmaValue> {
        self.emas
            .iter_mut()
            .map(|ema| EmaValue {
                period: ema.period(),
                value: ema.next(close),
            })
            .collect()
    }
}

/// EMA series for each period over the bars' closes.
pub fn compute_ema_basket(
    bars: &[Bar],
    periods: &[u32],
) -> Result<BTreeMap<u32, Vec<f64>>, IndicatorError> {
    let mut basket = EmaBasket::new(periods)?;
    IndicatorError::require(MIN_EMA_BARS, bars.len())?;

    let mut series: BTreeMap<u32, Vec<f64>> = periods
        .iter()
        .map(|&p| (p, Vec::with_capacity(bars.len())))
        .collect();
    for bar in bars {
        for value in basket.next(bar.close) {
            if let Some(line) = series.get_mut(&value.period) {
                line.push(value.value);
            }
        }
    }
    Ok(series)
}
