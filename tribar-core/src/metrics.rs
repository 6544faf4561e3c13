//! Performance metrics — pure functions over the trade ledger and equity curve.
//!
//! Every metric is a pure function: trades and/or equity curve in, scalar
//! out. Each ratio has an explicit divide-by-zero policy; none of them ever
//! returns NaN.

use crate::domain::ClosedTrade;

/// Profit factor: `sum(positive pnl) / |sum(negative pnl)|`.
///
/// `+inf` when there is no losing PnL (including the zero-trade case) —
/// a documented sentinel, not an error and not NaN.
pub fn profit_factor(trades: &[ClosedTrade]) -> f64 {
    let mut gross_profit = 0.0;
    let mut gross_loss = 0.0;
    for trade in trades {
        if trade.pnl_pct > 0.0 {
            gross_profit += trade.pnl_pct;
        } else {
            gross_loss += trade.pnl_pct.abs();
        }
    }
    if gross_loss == 0.0 {
        f64::INFINITY
    } else {
        gross_profit / gross_loss
    }
}

/// Win rate as a percentage of trades with positive PnL.
///
/// Exactly `0.0` for an empty ledger; the `0/0` case never propagates.
pub fn win_rate_pct(trades: &[ClosedTrade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64 * 100.0
}

/// Maximum drawdown as a positive percentage: `(peak - trough) / peak * 100`,
/// via a running maximum over the equity curve. `0.0` if equity never declines.
pub fn max_drawdown_pct(equity_curve: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0_f64;
    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        }
        if peak > 0.0 {
            let dd = (peak - equity) / peak * 100.0;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}
