//! Domain types: bars, price series, labels, positions, trades.

pub mod bar;
pub mod label;
pub mod position;
pub mod series;
pub mod trade;

pub use bar::Bar;
pub use label::{Label, Side};
pub use position::{ExitReason, OpenPosition};
pub use series::{PriceSeries, SeriesError};
pub use trade::ClosedTrade;
