//! Backtest engine: single-position walk-forward simulation.
//!
//! The engine replays a [`crate::domain::PriceSeries`] bar by bar, consuming an externally
//! produced per-bar [`Decision`] sequence, and maintains at most one open
//! position at a time. Exits use the same barrier-touch rule as the labeler
//! (stop-loss wins same-bar ambiguity), plus a horizon force-close and a
//! terminal force-close at the last available close.

pub mod backtest;
pub mod config;

pub use backtest::{run_backtest, BacktestResult, Decision, EngineError};
pub use config::{BacktestConfig, ConfigError};

use crate::domain::Label;

/// Barrier prices from a reference price and percentage distances.
///
/// Long: `tp = price * (1 + tp_pct)`, `sl = price * (1 - sl_pct)`.
/// Short: `tp = price * (1 - tp_pct)`, `sl = price * (1 + sl_pct)`.
/// Flat degenerates to `(price, price)` — well-defined, never an error.
pub fn tp_sl_from_pct(last_price: f64, tp_pct: f64, sl_pct: f64, side: Label) -> (f64, f64) {
    match side {
        Label::Long => (last_price * (1.0 + tp_pct), last_price * (1.0 - sl_pct)),
        Label::Short => (last_price * (1.0 - tp_pct), last_price * (1.0 + sl_pct)),
        Label::Flat => (last_price, last_price),
    }
}
