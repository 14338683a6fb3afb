//! Strategy evaluation over a full bar history.
//!
//! `SignalEngine::evaluate` is pure: it recomputes every indicator from the
//! given bars. The streaming evaluator in [`crate::signals::stream`] reaches
//! the same result incrementally.

use crate::indicators::structure::{compute_supertrend, trend_flip};
use crate::indicators::trend::{calculate_ema, compute_ema_basket, MIN_EMA_BARS};
use crate::indicators::IndicatorError;
use crate::models::indicators::{Bar, TrendState};
use crate::models::signal::{CrossingEvent, Direction, SignalEvaluation};
use crate::models::strategy::{MonitorStrategy, StrategyConfig};
use crate::signals::aggregation::AggregateCrossingEvaluator;
use crate::signals::crossing::CrossingDetector;

pub struct SignalEngine;

impl SignalEngine {
    /// Evaluate the configured strategy at the last bar of `bars`.
    pub fn evaluate(
        bars: &[Bar],
        config: &StrategyConfig,
    ) -> Result<SignalEvaluation, IndicatorError> {
        validate(config)?;
        let last = bars.last().ok_or(IndicatorError::InsufficientData {
            required: min_bars(&config.strategy),
            available: 0,
        })?;

        match &config.strategy {
            MonitorStrategy::SuperTrend { period, multiplier } => {
                let states = compute_supertrend(bars, *period, *multiplier)?;
                let curr = states.last().copied();
                let prev = states.len().checked_sub(2).map(|i| states[i]);
                supertrend_evaluation(prev, curr, last)
            }
            MonitorStrategy::SingleEma { period } => {
                IndicatorError::require(MIN_EMA_BARS, bars.len())?;
                let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
                let line = calculate_ema(&closes, *period)?;
                Ok(single_line_evaluation(config, &closes, &line, last))
            }
            MonitorStrategy::EmaBasket { periods } => {
                let series = compute_ema_basket(bars, periods)?;
                let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
                let lines: Vec<Vec<f64>> = periods
                    .iter()
                    .filter_map(|p| series.get(p).cloned())
                    .collect();
                Ok(basket_evaluation(config, &closes, &lines, last))
            }
        }
    }
}

/// Fewest bars a strategy needs before it can evaluate
pub fn min_bars(strategy: &MonitorStrategy) -> usize {
    match strategy {
        MonitorStrategy::SuperTrend { period, .. } => *period,
        MonitorStrategy::SingleEma { .. } | MonitorStrategy::EmaBasket { .. } => MIN_EMA_BARS,
    }
}

pub(crate) fn validate(config: &StrategyConfig) -> Result<(), IndicatorError> {
    if config.window_bars < config.confirmation.bars() {
        return Err(IndicatorError::InvalidParameter(format!(
            "window of {} bars cannot hold a {}-bar confirmation",
            config.window_bars,
            config.confirmation.bars()
        )));
    }
    Ok(())
}

pub(crate) fn detector(config: &StrategyConfig) -> CrossingDetector {
    CrossingDetector::new(config.window_bars, config.confirmation)
}

/// A SuperTrend flip is a confirmed edge event at the bar where it happens.
pub(crate) fn supertrend_evaluation(
    prev: Option<TrendState>,
    curr: Option<TrendState>,
    last: &Bar,
) -> Result<SignalEvaluation, IndicatorError> {
    let curr = curr.ok_or(IndicatorError::InsufficientData {
        required: 1,
        available: 0,
    })?;
    let direction = prev
        .map(|prev| trend_flip(&prev, &curr))
        .unwrap_or(Direction::Neutral);
    Ok(SignalEvaluation {
        event: CrossingEvent {
            direction,
            confirmed: !direction.is_neutral(),
            price: last.close,
            reference: curr.value,
        },
        reference: Some(curr.value),
        bar_time: last.timestamp,
    })
}

pub(crate) fn single_line_evaluation(
    config: &StrategyConfig,
    closes: &[f64],
    line: &[f64],
    last: &Bar,
) -> SignalEvaluation {
    let event = detector(config).detect(closes, line);
    SignalEvaluation {
        event,
        reference: line.last().copied(),
        bar_time: last.timestamp,
    }
}

pub(crate) fn basket_evaluation<R: AsRef<[f64]>>(
    config: &StrategyConfig,
    closes: &[f64],
    lines: &[R],
    last: &Bar,
) -> SignalEvaluation {
    let aggregate = AggregateCrossingEvaluator::new(detector(config)).evaluate_all(closes, lines);
    let latest = lines.iter().filter_map(|line| line.as_ref().last().copied());
    // The line crossed last is the outermost one in the crossing direction.
    let reference = match aggregate.direction {
        Direction::Down => latest.fold(f64::INFINITY, f64::min),
        _ => latest.fold(f64::NEG_INFINITY, f64::max),
    };
    SignalEvaluation {
        event: CrossingEvent {
            direction: aggregate.direction,
            confirmed: aggregate.all_crossed,
            price: last.close,
            reference,
        },
        reference: None,
        bar_time: last.timestamp,
    }
}
