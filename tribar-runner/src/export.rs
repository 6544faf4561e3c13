//! Artifact export: trade ledger CSV, equity curve CSV, result JSON,
//! and ranked sweep tables.
//!
//! Artifacts are plain structured data for downstream reporting; no format
//! beyond CSV/JSON is mandated anywhere.

use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::sweep::RankedRun;
use tribar_core::engine::BacktestResult;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv write error for '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct EquityRow {
    bar: usize,
    equity: f64,
}

#[derive(Debug, Serialize)]
struct RankingRow {
    rank: usize,
    run_id: String,
    tp_pct: f64,
    sl_pct: f64,
    threshold: f64,
    profit_factor: f64,
    win_rate: f64,
    max_drawdown_pct: f64,
    trades: usize,
    final_equity: f64,
}

fn csv_writer(path: &Path) -> Result<csv::Writer<std::fs::File>, ExportError> {
    let file = std::fs::File::create(path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(csv::Writer::from_writer(file))
}

fn finish_csv<W: std::io::Write>(
    mut writer: csv::Writer<W>,
    path: &Path,
) -> Result<(), ExportError> {
    writer.flush().map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Writes the trade ledger as CSV, one row per closed trade.
pub fn write_trades_csv(result: &BacktestResult, path: &Path) -> Result<(), ExportError> {
    let mut writer = csv_writer(path)?;
    for trade in &result.trades {
        writer.serialize(trade).map_err(|source| ExportError::Csv {
            path: path.display().to_string(),
            source,
        })?;
    }
    finish_csv(writer, path)
}

/// Writes the equity curve as CSV, one row per bar.
pub fn write_equity_csv(result: &BacktestResult, path: &Path) -> Result<(), ExportError> {
    let mut writer = csv_writer(path)?;
    for (bar, &equity) in result.equity_curve.iter().enumerate() {
        writer
            .serialize(EquityRow { bar, equity })
            .map_err(|source| ExportError::Csv {
                path: path.display().to_string(),
                source,
            })?;
    }
    finish_csv(writer, path)
}

/// Writes the full result as pretty JSON.
///
/// An infinite profit factor serializes as JSON null (serde_json's
/// representation for non-finite floats); consumers treat null as "no
/// losing trades".
pub fn write_result_json(result: &BacktestResult, path: &Path) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(path, json).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Writes a ranked sweep table as CSV, best combination first.
pub fn write_ranking_csv(ranked: &[&RankedRun], path: &Path) -> Result<(), ExportError> {
    let mut writer = csv_writer(path)?;
    for (rank, run) in ranked.iter().enumerate() {
        writer
            .serialize(RankingRow {
                rank: rank + 1,
                run_id: run.run_id.clone(),
                tp_pct: run.config.tp_pct,
                sl_pct: run.config.sl_pct,
                threshold: run.config.long_threshold,
                profit_factor: run.result.profit_factor,
                win_rate: run.result.win_rate,
                max_drawdown_pct: run.result.max_drawdown_pct,
                trades: run.result.trade_count(),
                final_equity: run.result.final_equity,
            })
            .map_err(|source| ExportError::Csv {
                path: path.display().to_string(),
                source,
            })?;
    }
    finish_csv(writer, path)
}
