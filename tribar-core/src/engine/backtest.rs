//! The walk-forward backtest loop and its result type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::config::{BacktestConfig, ConfigError};
use super::tp_sl_from_pct;
use crate::domain::{ClosedTrade, ExitReason, Label, OpenPosition, PriceSeries, Side};
use crate::labeler::first_touch::{bar_touch, BarrierTouch};
use crate::metrics;

/// Errors from a single backtest run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("decision sequence length {decisions} does not match series length {bars}")]
    DecisionLengthMismatch { decisions: usize, bars: usize },
}

/// Per-bar trade decision, produced by an external policy and aligned to the
/// series. The engine treats `confidence` as opaque; position sizing is a
/// configuration constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Hold,
    Enter { side: Side, confidence: f64 },
}

/// Complete output of one backtest run. Read-only once produced.
///
/// `win_rate` and `max_drawdown_pct` are percentages; `profit_factor` is
/// `+inf` when there are no losing trades (a documented sentinel, not an
/// error).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<f64>,
    pub final_equity: f64,
    pub profit_factor: f64,
    pub win_rate: f64,
    pub max_drawdown_pct: f64,
    pub bar_count: usize,
}

impl BacktestResult {
    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }
}

/// Entry price after adverse slippage: Long buys higher, Short sells lower.
fn entry_with_slippage(close: f64, slippage_pct: f64, side: Side) -> f64 {
    match side {
        Side::Long => close * (1.0 + slippage_pct),
        Side::Short => close * (1.0 - slippage_pct),
    }
}

/// Exit price after adverse slippage: Long sells lower, Short buys higher.
fn exit_with_slippage(raw_exit: f64, slippage_pct: f64, side: Side) -> f64 {
    match side {
        Side::Long => raw_exit * (1.0 - slippage_pct),
        Side::Short => raw_exit * (1.0 + slippage_pct),
    }
}

/// Converts an open position into a closed trade at `raw_exit_price`.
///
/// `pnl_pct` nets out exit slippage and both per-side fees; entry slippage is
/// already inside `entry_price`.
fn close_position(
    position: OpenPosition,
    exit_bar: usize,
    raw_exit_price: f64,
    exit_reason: ExitReason,
    config: &BacktestConfig,
) -> ClosedTrade {
    let exit_price = exit_with_slippage(raw_exit_price, config.slippage_pct, position.side);
    let gross = position.side.sign() * (exit_price - position.entry_price) / position.entry_price;
    let pnl_pct = gross - 2.0 * config.fee_pct;

    ClosedTrade {
        side: position.side,
        entry_bar: position.entry_bar,
        entry_price: position.entry_price,
        exit_bar,
        exit_price,
        exit_reason,
        pnl_pct,
        bars_held: exit_bar - position.entry_bar,
    }
}

/// Replays `series` bar by bar under `decisions` and `config`.
///
/// State machine per bar:
/// - Flat: an `Enter` decision opens a position at that bar's close
///   (adverse slippage applied), barriers set via [`tp_sl_from_pct`].
/// - Open: the bar's high/low are checked with the labeler's barrier-touch
///   rule (stop-loss wins same-bar ambiguity); with neither barrier touched
///   and `bars_held >= horizon`, the position force-closes at the close.
/// - End of series while open: force-close at the last available close,
///   so no dangling position escapes the reported results.
///
/// A position opened at bar `i` is never exit-checked against bar `i`
/// itself; exits start at `i + 1` (no look-ahead, no same-bar round trip).
///
/// Equity updates multiplicatively on each exit:
/// `equity *= 1 + pnl_pct * position_fraction`. The curve holds one value
/// per processed bar.
pub fn run_backtest(
    series: &PriceSeries,
    decisions: &[Decision],
    config: &BacktestConfig,
) -> Result<BacktestResult, EngineError> {
    config.validate()?;
    if decisions.len() != series.len() {
        return Err(EngineError::DecisionLengthMismatch {
            decisions: decisions.len(),
            bars: series.len(),
        });
    }

    let bars = series.bars();
    let mut equity = config.initial_equity;
    let mut equity_curve = Vec::with_capacity(bars.len());
    let mut trades: Vec<ClosedTrade> = Vec::new();
    let mut open: Option<OpenPosition> = None;

    for (i, bar) in bars.iter().enumerate() {
        if let Some(position) = &open {
            let exit = match bar_touch(bar, position.take_profit, position.stop_loss, position.side)
            {
                Some(BarrierTouch::StopLoss) => Some((position.stop_loss, ExitReason::StopLoss)),
                Some(BarrierTouch::TakeProfit) => {
                    Some((position.take_profit, ExitReason::TakeProfit))
                }
                None if i - position.entry_bar >= config.horizon => {
                    Some((bar.close, ExitReason::Horizon))
                }
                None => None,
            };
            if let Some((raw_exit, reason)) = exit {
                let position = open.take().expect("position checked above");
                let trade = close_position(position, i, raw_exit, reason, config);
                equity *= 1.0 + trade.pnl_pct * config.position_fraction;
                trades.push(trade);
            }
        } else if let Decision::Enter { side, .. } = decisions[i] {
            let side_label = match side {
                Side::Long => Label::Long,
                Side::Short => Label::Short,
            };
            let (take_profit, stop_loss) =
                tp_sl_from_pct(bar.close, config.tp_pct, config.sl_pct, side_label);
            open = Some(OpenPosition {
                side,
                entry_bar: i,
                entry_price: entry_with_slippage(bar.close, config.slippage_pct, side),
                take_profit,
                stop_loss,
            });
        }
        equity_curve.push(equity);
    }

    // Terminal: still open at end of series — force-close at the last close.
    if let Some(position) = open.take() {
        let last = bars.len() - 1;
        let trade = close_position(position, last, bars[last].close, ExitReason::EndOfData, config);
        equity *= 1.0 + trade.pnl_pct * config.position_fraction;
        trades.push(trade);
        if let Some(v) = equity_curve.last_mut() {
            *v = equity;
        }
    }

    Ok(BacktestResult {
        profit_factor: metrics::profit_factor(&trades),
        win_rate: metrics::win_rate_pct(&trades),
        max_drawdown_pct: metrics::max_drawdown_pct(&equity_curve),
        bar_count: bars.len(),
        final_equity: equity,
        trades,
        equity_curve,
    })
}
