//! First-touch barrier scan for a single hypothetical trade.

use crate::domain::{Bar, Side};

/// Outcome of scanning forward from an entry bar for barrier touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchOutcome {
    /// Take-profit touched first, at this bar index.
    TakeProfit(usize),
    /// Stop-loss touched first, at this bar index.
    StopLoss(usize),
    /// Neither barrier touched within the horizon.
    NoTouch,
}

/// Which barrier a single bar touched, after tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierTouch {
    TakeProfit,
    StopLoss,
}

/// Checks one bar's high/low against the barrier prices for the given side.
///
/// Tie-break: when the bar breaches both barriers (high reaches TP and low
/// reaches SL within the same candle), the stop-loss wins. Intrabar order is
/// unknowable from OHLC alone, so the conservative reading is taken. Both
/// the labeler and the backtest engine go through this function, keeping the
/// rule identical in the two places it matters.
pub fn bar_touch(bar: &Bar, tp_price: f64, sl_price: f64, side: Side) -> Option<BarrierTouch> {
    let (tp_hit, sl_hit) = match side {
        Side::Long => (bar.high >= tp_price, bar.low <= sl_price),
        Side::Short => (bar.low <= tp_price, bar.high >= sl_price),
    };
    if sl_hit {
        Some(BarrierTouch::StopLoss)
    } else if tp_hit {
        Some(BarrierTouch::TakeProfit)
    } else {
        None
    }
}

/// Scans bars `entry_bar+1 ..= entry_bar+horizon` in time order and reports
/// which barrier a trade opened at `entry_bar` would have touched first.
///
/// The caller guarantees `entry_bar + horizon < bars.len()`. The scan is a
/// plain linear walk with early termination; nothing may reorder it, since
/// first-touch order is the whole point.
pub fn first_touch(
    bars: &[Bar],
    entry_bar: usize,
    horizon: usize,
    tp_price: f64,
    sl_price: f64,
    side: Side,
) -> TouchOutcome {
    for j in entry_bar + 1..=entry_bar + horizon {
        match bar_touch(&bars[j], tp_price, sl_price, side) {
            Some(BarrierTouch::StopLoss) => return TouchOutcome::StopLoss(j),
            Some(BarrierTouch::TakeProfit) => return TouchOutcome::TakeProfit(j),
            None => {}
        }
    }
    TouchOutcome::NoTouch
}
