//! ClosedTrade — a completed round-trip trade record.

use super::label::Side;
use super::position::ExitReason;
use serde::{Deserialize, Serialize};

/// Immutable record appended to the trade ledger when a position exits.
///
/// `pnl_pct` is net of both fees and both (adverse) slippage applications,
/// expressed as a fraction of the effective entry price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub side: Side,
    pub entry_bar: usize,
    pub entry_price: f64,
    pub exit_bar: usize,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    pub pnl_pct: f64,
    pub bars_held: usize,
}

impl ClosedTrade {
    pub fn is_winner(&self) -> bool {
        self.pnl_pct > 0.0
    }
}
