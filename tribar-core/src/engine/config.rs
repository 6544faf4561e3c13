//! Backtest run parameters with fail-fast validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by [`BacktestConfig::validate`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tp_pct must be positive, got {0}")]
    NonPositiveTakeProfit(f64),

    #[error("sl_pct must be positive, got {0}")]
    NonPositiveStopLoss(f64),

    #[error("horizon must be at least 1 bar")]
    ZeroHorizon,

    #[error("fee_pct must be non-negative and finite, got {0}")]
    BadFee(f64),

    #[error("slippage_pct must be non-negative and finite, got {0}")]
    BadSlippage(f64),

    #[error("position_fraction must be in (0, 1], got {0}")]
    BadPositionFraction(f64),

    #[error("initial_equity must be positive, got {0}")]
    BadInitialEquity(f64),
}

/// All parameters for one backtest run. Immutable once constructed.
///
/// Percentages are fractions (0.01 = 1%). `fee_pct` is charged per side;
/// `slippage_pct` is applied adversely at entry and exit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub tp_pct: f64,
    pub sl_pct: f64,
    pub horizon: usize,
    pub fee_pct: f64,
    pub slippage_pct: f64,
    /// Fraction of equity exposed per trade (a configuration constant,
    /// not a per-trade decision).
    pub position_fraction: f64,
    pub initial_equity: f64,
}

impl BacktestConfig {
    /// Checks every parameter. Called by the engine before any simulation
    /// step runs, so a bad config never produces partial results.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tp_pct > 0.0) || !self.tp_pct.is_finite() {
            return Err(ConfigError::NonPositiveTakeProfit(self.tp_pct));
        }
        if !(self.sl_pct > 0.0) || !self.sl_pct.is_finite() {
            return Err(ConfigError::NonPositiveStopLoss(self.sl_pct));
        }
        if self.horizon == 0 {
            return Err(ConfigError::ZeroHorizon);
        }
        if !(self.fee_pct >= 0.0) || !self.fee_pct.is_finite() {
            return Err(ConfigError::BadFee(self.fee_pct));
        }
        if !(self.slippage_pct >= 0.0) || !self.slippage_pct.is_finite() {
            return Err(ConfigError::BadSlippage(self.slippage_pct));
        }
        if !(self.position_fraction > 0.0 && self.position_fraction <= 1.0) {
            return Err(ConfigError::BadPositionFraction(self.position_fraction));
        }
        if !(self.initial_equity > 0.0) || !self.initial_equity.is_finite() {
            return Err(ConfigError::BadInitialEquity(self.initial_equity));
        }
        Ok(())
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            tp_pct: 0.01,
            sl_pct: 0.01,
            horizon: 24,
            fee_pct: 0.0004,
            slippage_pct: 0.0002,
            position_fraction: 1.0,
            initial_equity: 10_000.0,
        }
    }
}
