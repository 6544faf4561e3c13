//! TriBar Core — triple-barrier labeler and single-position backtest engine.
//!
//! This crate contains the heart of the system:
//! - Domain types (bars, price series, labels, positions, trades)
//! - First-touch triple-barrier labeler with class weighting
//! - Bar-by-bar backtest state machine with fee and slippage accounting
//! - Pure metric functions (profit factor, win rate, max drawdown)
//!
//! Everything here is a pure function of its inputs: no globals, no I/O,
//! fully reentrant. Data loading, decision policies, and parameter sweeps
//! live in `tribar-runner`.

pub mod domain;
pub mod engine;
pub mod labeler;
pub mod metrics;
