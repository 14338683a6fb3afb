//! Incremental per-series evaluation.
//!
//! Each evaluator feeds only bars newer than the last one it has seen and
//! keeps the trailing window the crossing detector needs, so a polling loop
//! does constant work per new bar instead of recomputing the whole history.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::indicators::structure::SuperTrend;
use crate::indicators::trend::{Ema, EmaBasket};
use crate::indicators::IndicatorError;
use crate::models::indicators::{Bar, TrendState};
use crate::models::signal::SignalEvaluation;
use crate::models::strategy::{MonitorStrategy, StrategyConfig};
use crate::signals::engine::{self, min_bars};

#[derive(Debug, Clone)]
enum Engines {
    SuperTrend {
        engine: SuperTrend,
        prev: Option<TrendState>,
        curr: Option<TrendState>,
    },
    SingleEma {
        ema: Ema,
        line: VecDeque<f64>,
    },
    EmaBasket {
        basket: EmaBasket,
        lines: Vec<VecDeque<f64>>,
    },
}

#[derive(Debug, Clone)]
pub struct StreamingEvaluator {
    config: StrategyConfig,
    engines: Engines,
    closes: VecDeque<f64>,
    bars_seen: usize,
    last_bar: Option<Bar>,
}

fn push_bounded(window: &mut VecDeque<f64>, value: f64, cap: usize) {
    window.push_back(value);
    while window.len() > cap {
        window.pop_front();
    }
}

impl StreamingEvaluator {
    pub fn new(config: StrategyConfig) -> Result<Self, IndicatorError> {
        engine::validate(&config)?;
        let engines = match &config.strategy {
            MonitorStrategy::SuperTrend { period, multiplier } => Engines::SuperTrend {
                engine: SuperTrend::new(*period, *multiplier)?,
                prev: None,
                curr: None,
            },
            MonitorStrategy::SingleEma { period } => Engines::SingleEma {
                ema: Ema::new(*period)?,
                line: VecDeque::with_capacity(config.window_bars),
            },
            MonitorStrategy::EmaBasket { periods } => {
                let basket = EmaBasket::new(periods)?;
                let lines = vec![VecDeque::with_capacity(config.window_bars); basket.len()];
                Engines::EmaBasket { basket, lines }
            }
        };
        Ok(Self {
            config,
            engines,
            closes: VecDeque::new(),
            bars_seen: 0,
            last_bar: None,
        })
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn bars_seen(&self) -> usize {
        self.bars_seen
    }

    pub fn last_time(&self) -> Option<DateTime<Utc>> {
        self.last_bar.map(|b| b.timestamp)
    }

    /// Feed the bars of `series` newer than the last seen one and evaluate
    /// at the newest bar.
    pub fn update(&mut self, series: &[Bar]) -> Result<SignalEvaluation, IndicatorError> {
        for bar in series {
            self.push(bar);
        }
        self.evaluate()
    }

    /// Feed a single bar. Bars not newer than the last one are ignored.
    pub fn push(&mut self, bar: &Bar) {
        if let Some(last) = self.last_bar {
            if bar.timestamp <= last.timestamp {
                return;
            }
        }
        let window = self.config.window_bars;
        push_bounded(&mut self.closes, bar.close, window);
        match &mut self.engines {
            Engines::SuperTrend { engine, prev, curr } => {
                if let Some(state) = engine.next(bar) {
                    *prev = curr.take();
                    *curr = Some(state);
                }
            }
            Engines::SingleEma { ema, line } => {
                push_bounded(line, ema.next(bar.close), window);
            }
            Engines::EmaBasket { basket, lines } => {
                for (line, value) in lines.iter_mut().zip(basket.next(bar.close)) {
                    push_bounded(line, value.value, window);
                }
            }
        }
        self.bars_seen += 1;
        self.last_bar = Some(*bar);
    }

    /// Evaluate at the newest bar fed so far
    pub fn evaluate(&self) -> Result<SignalEvaluation, IndicatorError> {
        IndicatorError::require(min_bars(&self.config.strategy), self.bars_seen)?;
        let last = self.last_bar.ok_or(IndicatorError::InsufficientData {
            required: min_bars(&self.config.strategy),
            available: 0,
        })?;

        let closes: Vec<f64> = self.closes.iter().copied().collect();
        match &self.engines {
            Engines::SuperTrend { prev, curr, .. } => {
                engine::supertrend_evaluation(*prev, *curr, &last)
            }
            Engines::SingleEma { line, .. } => {
                let line: Vec<f64> = line.iter().copied().collect();
                Ok(engine::single_line_evaluation(&self.config, &closes, &line, &last))
            }
            Engines::EmaBasket { lines, .. } => {
                let lines: Vec<Vec<f64>> = lines
                    .iter()
                    .map(|line| line.iter().copied().collect())
                    .collect();
                Ok(engine::basket_evaluation(&self.config, &closes, &lines, &last))
            }
        }
    }
}
