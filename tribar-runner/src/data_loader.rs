//! CSV loading for price series and model probabilities, plus synthetic data.
//!
//! Expected price CSV columns: `time, open, high, low, close, volume`, with
//! `time` as epoch milliseconds. Probability CSV columns: `flat, long, short`
//! (one row per bar, aligned to the price CSV).
//!
//! A missing or malformed file is fatal and surfaced to the caller; the
//! sweep never ranks results built on partial inputs.

use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tribar_core::domain::{Bar, PriceSeries, SeriesError};

use crate::policy::ClassProbs;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv parse error in '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("row {row}: invalid epoch-millisecond timestamp {value}")]
    BadTimestamp { row: usize, value: i64 },

    #[error(transparent)]
    Series(#[from] SeriesError),
}

#[derive(Debug, Deserialize)]
struct PriceRecord {
    time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct ProbRecord {
    flat: f64,
    long: f64,
    short: f64,
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(csv::Reader::from_reader(file))
}

/// Loads a `time, open, high, low, close, volume` CSV into a validated
/// [`PriceSeries`]. Ordering and OHLC sanity are enforced by
/// `PriceSeries::from_bars`.
pub fn load_prices_csv(path: &Path) -> Result<PriceSeries, LoadError> {
    let mut reader = open_reader(path)?;
    let mut bars = Vec::new();
    for (row, record) in reader.deserialize::<PriceRecord>().enumerate() {
        let record = record.map_err(|source| LoadError::Csv {
            path: path.display().to_string(),
            source,
        })?;
        let timestamp: DateTime<Utc> = Utc
            .timestamp_millis_opt(record.time)
            .single()
            .ok_or(LoadError::BadTimestamp {
                row,
                value: record.time,
            })?;
        bars.push(Bar {
            timestamp,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        });
    }
    Ok(PriceSeries::from_bars(bars)?)
}

/// Loads a `flat, long, short` probability CSV, one row per bar.
pub fn load_probs_csv(path: &Path) -> Result<Vec<ClassProbs>, LoadError> {
    let mut reader = open_reader(path)?;
    let mut probs = Vec::new();
    for record in reader.deserialize::<ProbRecord>() {
        let record = record.map_err(|source| LoadError::Csv {
            path: path.display().to_string(),
            source,
        })?;
        probs.push(ClassProbs {
            flat: record.flat,
            long: record.long,
            short: record.short,
        });
    }
    Ok(probs)
}

/// Deterministic synthetic random-walk series for demos and tests.
///
/// Seeded, so the same `(seed, n)` always produces the same series. Tagged
/// as synthetic by construction — never mixed with real data implicitly.
pub fn synthetic_series(seed: u64, n: usize) -> PriceSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let mut close = 100.0_f64;
    let mut bars = Vec::with_capacity(n);
    for i in 0..n {
        let open = close;
        let step: f64 = rng.gen_range(-0.01..0.01);
        close *= 1.0 + step;
        let wick_up: f64 = rng.gen_range(0.0..0.004);
        let wick_down: f64 = rng.gen_range(0.0..0.004);
        bars.push(Bar {
            timestamp: base + chrono::Duration::minutes(i as i64),
            open,
            high: open.max(close) * (1.0 + wick_up),
            low: open.min(close) * (1.0 - wick_down),
            close,
            volume: rng.gen_range(100.0..10_000.0),
        });
    }
    PriceSeries::from_bars(bars).expect("synthetic bars are sane by construction")
}
