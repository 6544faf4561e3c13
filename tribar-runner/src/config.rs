//! Serializable run configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tribar_core::engine::{BacktestConfig, ConfigError};

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum RunConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Invalid(#[from] ConfigError),

    #[error("long_threshold must be in [0, 1], got {0}")]
    BadLongThreshold(f64),

    #[error("short_threshold must be in [0, 1], got {0}")]
    BadShortThreshold(f64),
}

/// Everything needed to reproduce one backtest run: engine parameters plus
/// the decision-policy thresholds. Loadable from TOML.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub tp_pct: f64,
    pub sl_pct: f64,
    pub horizon: usize,
    pub fee_pct: f64,
    pub slippage_pct: f64,
    pub position_fraction: f64,
    pub initial_equity: f64,
    /// Minimum long-class probability to open a Long.
    pub long_threshold: f64,
    /// Minimum short-class probability to open a Short.
    pub short_threshold: f64,
}

impl RunConfig {
    /// Loads and validates a TOML config file.
    pub fn from_toml_file(path: &Path) -> Result<Self, RunConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| RunConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: RunConfig = toml::from_str(&text).map_err(|source| RunConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates engine parameters and thresholds.
    pub fn validate(&self) -> Result<(), RunConfigError> {
        self.engine_config().validate()?;
        if !(0.0..=1.0).contains(&self.long_threshold) {
            return Err(RunConfigError::BadLongThreshold(self.long_threshold));
        }
        if !(0.0..=1.0).contains(&self.short_threshold) {
            return Err(RunConfigError::BadShortThreshold(self.short_threshold));
        }
        Ok(())
    }

    /// Engine-side view of this configuration.
    pub fn engine_config(&self) -> BacktestConfig {
        BacktestConfig {
            tp_pct: self.tp_pct,
            sl_pct: self.sl_pct,
            horizon: self.horizon,
            fee_pct: self.fee_pct,
            slippage_pct: self.slippage_pct,
            position_fraction: self.position_fraction,
            initial_equity: self.initial_equity,
        }
    }

    /// Deterministic content hash of this configuration.
    ///
    /// Two runs with identical configs share a RunId, which is what makes
    /// sweep rows identifiable across sessions.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tp_pct: 0.01,
            sl_pct: 0.01,
            horizon: 24,
            fee_pct: 0.0004,
            slippage_pct: 0.0002,
            position_fraction: 1.0,
            initial_equity: 10_000.0,
            long_threshold: 0.6,
            short_threshold: 0.6,
        }
    }
}
