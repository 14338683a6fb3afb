//! Monitoring strategy configuration

use serde::{Deserialize, Serialize};

/// Default EMA basket: 20 lines, periods 10 through 200.
pub fn default_basket_periods() -> Vec<u32> {
    (1..=20).map(|i| i * 10).collect()
}

/// Which indicator condition is monitored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MonitorStrategy {
    /// SuperTrend sign flips
    SuperTrend { period: usize, multiplier: f64 },
    /// Close crossing one EMA (EMA200 by default)
    SingleEma { period: u32 },
    /// Close crossing every EMA of a basket in the same direction
    EmaBasket { periods: Vec<u32> },
}

impl Default for MonitorStrategy {
    fn default() -> Self {
        MonitorStrategy::SuperTrend {
            period: 10,
            multiplier: 3.0,
        }
    }
}

/// Number of bars a crossing pattern must span before it counts as confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfirmationDepth {
    /// Pre-cross bar plus crossing bar
    TwoBar,
    /// Pre-cross bar, crossing bar and one bar holding past the reference
    #[default]
    ThreeBar,
}

impl ConfirmationDepth {
    pub fn bars(self) -> usize {
        match self {
            ConfirmationDepth::TwoBar => 2,
            ConfirmationDepth::ThreeBar => 3,
        }
    }

    pub fn from_bars(bars: usize) -> Option<Self> {
        match bars {
            2 => Some(ConfirmationDepth::TwoBar),
            3 => Some(ConfirmationDepth::ThreeBar),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub strategy: MonitorStrategy,
    pub confirmation: ConfirmationDepth,
    /// Trailing bars inspected by the crossing detector
    pub window_bars: usize,
}

impl StrategyConfig {
    pub fn new(strategy: MonitorStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn with_confirmation(mut self, confirmation: ConfirmationDepth) -> Self {
        self.confirmation = confirmation;
        self
    }

    pub fn with_window(mut self, window_bars: usize) -> Self {
        self.window_bars = window_bars;
        self
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            strategy: MonitorStrategy::default(),
            confirmation: ConfirmationDepth::default(),
            window_bars: 4,
        }
    }
}
