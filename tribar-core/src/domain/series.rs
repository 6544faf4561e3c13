//! PriceSeries — a validated, time-ordered sequence of bars.

use super::bar::Bar;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while validating a bar sequence.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("bar {index}: timestamps must be strictly increasing ({prev} >= {curr})")]
    NonMonotonicTimestamps {
        index: usize,
        prev: String,
        curr: String,
    },

    #[error("bar {index}: OHLCV sanity check failed (high < low, non-positive price, or NaN)")]
    InsaneBar { index: usize },
}

/// Ordered sequence of bars, indexed 0..N-1 by position; index order = time order.
///
/// Construction validates every bar and the timestamp ordering, so downstream
/// code (labeler, engine) can assume a well-formed series. Callers own the
/// series; the labeler and engine only borrow it read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Validates and wraps a bar sequence.
    ///
    /// Fails fast on the first insane bar or out-of-order timestamp; no
    /// partially validated series is ever returned.
    pub fn from_bars(bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for (i, bar) in bars.iter().enumerate() {
            if !bar.is_sane() {
                return Err(SeriesError::InsaneBar { index: i });
            }
            if i > 0 && bars[i - 1].timestamp >= bar.timestamp {
                return Err(SeriesError::NonMonotonicTimestamps {
                    index: i,
                    prev: bars[i - 1].timestamp.to_rfc3339(),
                    curr: bar.timestamp.to_rfc3339(),
                });
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    /// Close price at `index`. Panics if out of range (callers iterate 0..len).
    pub fn close(&self, index: usize) -> f64 {
        self.bars[index].close
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bar_at(minute: i64, close: f64) -> Bar {
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        Bar {
            timestamp: base + Duration::minutes(minute),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn accepts_ordered_bars() {
        let series = PriceSeries::from_bars(vec![bar_at(0, 100.0), bar_at(1, 101.0)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.close(1), 101.0);
    }

    #[test]
    fn accepts_empty_series() {
        let series = PriceSeries::from_bars(vec![]).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn rejects_out_of_order_timestamps() {
        let err = PriceSeries::from_bars(vec![bar_at(1, 100.0), bar_at(0, 101.0)]).unwrap_err();
        assert!(matches!(
            err,
            SeriesError::NonMonotonicTimestamps { index: 1, .. }
        ));
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let err = PriceSeries::from_bars(vec![bar_at(0, 100.0), bar_at(0, 101.0)]).unwrap_err();
        assert!(matches!(err, SeriesError::NonMonotonicTimestamps { .. }));
    }

    #[test]
    fn rejects_insane_bar() {
        let mut bad = bar_at(0, 100.0);
        bad.high = bad.low - 1.0;
        let err = PriceSeries::from_bars(vec![bad]).unwrap_err();
        assert!(matches!(err, SeriesError::InsaneBar { index: 0 }));
    }
}
