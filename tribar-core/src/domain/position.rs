//! OpenPosition — the engine's mutable state while a trade is open.

use super::label::Side;
use serde::{Deserialize, Serialize};

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    /// Take-profit barrier touched first.
    TakeProfit,
    /// Stop-loss barrier touched first (also wins same-bar ambiguity).
    StopLoss,
    /// Horizon expired with neither barrier touched; closed at that bar's close.
    Horizon,
    /// Series ended while the position was still open; closed at the last close.
    EndOfData,
}

/// A single open position. The engine holds at most one of these at a time.
///
/// Created on entry, consumed into a `ClosedTrade` on exit. `entry_price`
/// already includes adverse entry slippage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenPosition {
    pub side: Side,
    pub entry_bar: usize,
    pub entry_price: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
}
