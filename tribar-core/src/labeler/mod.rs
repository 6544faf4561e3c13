//! Triple-barrier labeler: first-touch outcomes and class weights.
//!
//! For each bar `i`, the labeler simulates a hypothetical Long and a
//! hypothetical Short opened at `close[i]`, scans the next `horizon` bars
//! for the first barrier touch on each side, and emits one combined label:
//!
//! - Long (1) if the long side hit its take-profit first;
//! - else Short (2) if the short side hit its take-profit first;
//! - else Flat (0).
//!
//! Long priority across sides is a deliberate policy choice; within one side
//! the same-bar TP+SL ambiguity resolves to the stop-loss (see
//! [`first_touch::bar_touch`]).

pub mod first_touch;

use crate::domain::{Label, PriceSeries, Side};
use crate::engine::tp_sl_from_pct;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub use first_touch::{bar_touch, BarrierTouch, TouchOutcome};

/// Errors raised while validating a [`BarrierConfig`].
#[derive(Debug, Error)]
pub enum BarrierError {
    #[error("take_profit_pct must be positive, got {0}")]
    NonPositiveTakeProfit(f64),

    #[error("stop_loss_pct must be positive, got {0}")]
    NonPositiveStopLoss(f64),

    #[error("horizon must be at least 1 bar")]
    ZeroHorizon,
}

/// One labeling rule set: barrier distances and horizon. Immutable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarrierConfig {
    pub take_profit_pct: f64,
    pub stop_loss_pct: f64,
    pub horizon: usize,
}

impl BarrierConfig {
    /// Validates and constructs a config. Fails fast on non-positive
    /// fractions or a zero horizon; nothing downstream re-checks.
    pub fn new(
        take_profit_pct: f64,
        stop_loss_pct: f64,
        horizon: usize,
    ) -> Result<Self, BarrierError> {
        if !(take_profit_pct > 0.0) {
            return Err(BarrierError::NonPositiveTakeProfit(take_profit_pct));
        }
        if !(stop_loss_pct > 0.0) {
            return Err(BarrierError::NonPositiveStopLoss(stop_loss_pct));
        }
        if horizon == 0 {
            return Err(BarrierError::ZeroHorizon);
        }
        Ok(Self {
            take_profit_pct,
            stop_loss_pct,
            horizon,
        })
    }
}

/// Labels every bar of `series` under `config`.
///
/// Bars with fewer than `horizon` future bars are Flat: insufficient future
/// data is a legitimate terminal policy, not an error. The scan is
/// O(N * horizon); each side terminates at its first touch.
pub fn label(series: &PriceSeries, config: &BarrierConfig) -> Vec<Label> {
    let bars = series.bars();
    let n = bars.len();
    let mut labels = Vec::with_capacity(n);

    for i in 0..n {
        if i + config.horizon >= n {
            labels.push(Label::Flat);
            continue;
        }
        let entry = bars[i].close;

        let (tp_long, sl_long) = tp_sl_from_pct(
            entry,
            config.take_profit_pct,
            config.stop_loss_pct,
            Label::Long,
        );
        let long_outcome =
            first_touch::first_touch(bars, i, config.horizon, tp_long, sl_long, Side::Long);

        let (tp_short, sl_short) = tp_sl_from_pct(
            entry,
            config.take_profit_pct,
            config.stop_loss_pct,
            Label::Short,
        );
        let short_outcome =
            first_touch::first_touch(bars, i, config.horizon, tp_short, sl_short, Side::Short);

        // Long takes priority when both sides would independently hit TP.
        let label = if matches!(long_outcome, TouchOutcome::TakeProfit(_)) {
            Label::Long
        } else if matches!(short_outcome, TouchOutcome::TakeProfit(_)) {
            Label::Short
        } else {
            Label::Flat
        };
        labels.push(label);
    }

    labels
}

/// Balanced class weights for imbalanced-loss training:
/// `weight = total / (classes_present * count(class))`.
///
/// Classes absent from the input get no entry; callers treat a missing key
/// as "weight irrelevant", never as a lookup failure.
pub fn class_weights(labels: &[Label]) -> HashMap<Label, f64> {
    let mut counts: HashMap<Label, usize> = HashMap::new();
    for &l in labels {
        *counts.entry(l).or_insert(0) += 1;
    }

    let total = labels.len() as f64;
    let classes_present = counts.len() as f64;

    counts
        .into_iter()
        .map(|(label, count)| (label, total / (classes_present * count as f64)))
        .collect()
}
