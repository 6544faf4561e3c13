//! Parameter sweep: grid expansion, parallel execution, deterministic ranking.

use rayon::prelude::*;
use thiserror::Error;

use crate::config::{RunConfig, RunId};
use crate::policy::{decisions_from_probs, ClassProbs};
use tribar_core::domain::PriceSeries;
use tribar_core::engine::{run_backtest, BacktestResult, EngineError};

/// Errors that abort a sweep. One failing combination fails the whole
/// sweep; partial results are never ranked alongside valid ones.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("probability matrix length {probs} does not match series length {bars}")]
    ProbsLengthMismatch { probs: usize, bars: usize },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Candidate parameter lists. The sweep runs the cartesian product
/// tp × sl × threshold (one threshold applied to both sides).
#[derive(Debug, Clone)]
pub struct ParamGrid {
    pub tp_pcts: Vec<f64>,
    pub sl_pcts: Vec<f64>,
    pub thresholds: Vec<f64>,
}

impl ParamGrid {
    /// Total number of combinations in this grid.
    pub fn size(&self) -> usize {
        self.tp_pcts.len() * self.sl_pcts.len() * self.thresholds.len()
    }

    /// Expands the grid against a base config. Grid axes override the base;
    /// everything else (horizon, fees, sizing) is inherited.
    pub fn generate_configs(&self, base: &RunConfig) -> Vec<RunConfig> {
        let mut configs = Vec::with_capacity(self.size());
        for &tp_pct in &self.tp_pcts {
            for &sl_pct in &self.sl_pcts {
                for &threshold in &self.thresholds {
                    let mut config = *base;
                    config.tp_pct = tp_pct;
                    config.sl_pct = sl_pct;
                    config.long_threshold = threshold;
                    config.short_threshold = threshold;
                    configs.push(config);
                }
            }
        }
        configs
    }
}

/// One completed sweep combination.
#[derive(Debug, Clone)]
pub struct RankedRun {
    pub run_id: RunId,
    pub config: RunConfig,
    pub result: BacktestResult,
}

/// Sweep executor over one shared price series and probability matrix.
///
/// Combinations are independent: each one only reads the shared inputs and
/// writes its own result slot, so parallel execution needs no coordination
/// beyond collecting results.
pub struct ParamSweep<'a> {
    series: &'a PriceSeries,
    probs: &'a [ClassProbs],
    parallel: bool,
}

impl<'a> ParamSweep<'a> {
    pub fn new(series: &'a PriceSeries, probs: &'a [ClassProbs]) -> Self {
        Self {
            series,
            probs,
            parallel: true,
        }
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn run_one(&self, config: &RunConfig) -> Result<RankedRun, SweepError> {
        if self.probs.len() != self.series.len() {
            return Err(SweepError::ProbsLengthMismatch {
                probs: self.probs.len(),
                bars: self.series.len(),
            });
        }
        let decisions =
            decisions_from_probs(self.probs, config.long_threshold, config.short_threshold);
        let result = run_backtest(self.series, &decisions, &config.engine_config())?;
        Ok(RankedRun {
            run_id: config.run_id(),
            config: *config,
            result,
        })
    }

    /// Runs every combination in the grid. Fail-fast: the first error
    /// aborts the sweep and nothing is returned.
    pub fn sweep(&self, grid: &ParamGrid, base: &RunConfig) -> Result<SweepResults, SweepError> {
        let configs = grid.generate_configs(base);

        let runs: Vec<RankedRun> = if self.parallel {
            configs
                .par_iter()
                .map(|config| self.run_one(config))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            configs
                .iter()
                .map(|config| self.run_one(config))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(SweepResults { runs })
    }
}

/// Results from a completed sweep, in grid order.
#[derive(Debug)]
pub struct SweepResults {
    runs: Vec<RankedRun>,
}

impl SweepResults {
    /// Wraps an already-computed run list (mainly for tests and callers
    /// that assemble runs themselves).
    pub fn from_runs(runs: Vec<RankedRun>) -> Self {
        Self { runs }
    }

    pub fn all(&self) -> &[RankedRun] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Ranked view: profit factor descending, then win rate descending,
    /// then trade count ascending (prefer fewer, larger-edge trades when
    /// performance is otherwise tied). A pure three-key sort — identical
    /// inputs always rank identically.
    pub fn ranked(&self) -> Vec<&RankedRun> {
        let mut sorted: Vec<&RankedRun> = self.runs.iter().collect();
        sorted.sort_by(|a, b| {
            b.result
                .profit_factor
                .partial_cmp(&a.result.profit_factor)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    b.result
                        .win_rate
                        .partial_cmp(&a.result.win_rate)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.result.trade_count().cmp(&b.result.trade_count()))
        });
        sorted
    }

    pub fn best(&self) -> Option<&RankedRun> {
        self.ranked().into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tribar_core::domain::{ClosedTrade, ExitReason, Side};

    fn make_trade(pnl_pct: f64) -> ClosedTrade {
        ClosedTrade {
            side: Side::Long,
            entry_bar: 0,
            entry_price: 100.0,
            exit_bar: 1,
            exit_price: 100.0 * (1.0 + pnl_pct),
            exit_reason: ExitReason::TakeProfit,
            pnl_pct,
            bars_held: 1,
        }
    }

    fn make_run(profit_factor: f64, win_rate: f64, trade_count: usize) -> RankedRun {
        let trades = (0..trade_count).map(|_| make_trade(0.01)).collect();
        let mut config = RunConfig::default();
        // Vary a field so run_ids differ per synthetic run.
        config.tp_pct = 0.001 + profit_factor * 0.001 + win_rate * 1e-5 + trade_count as f64 * 1e-7;
        RankedRun {
            run_id: config.run_id(),
            config,
            result: BacktestResult {
                trades,
                equity_curve: vec![10_000.0],
                final_equity: 10_000.0,
                profit_factor,
                win_rate,
                max_drawdown_pct: 0.0,
                bar_count: 1,
            },
        }
    }

    #[test]
    fn grid_size_and_expansion() {
        let grid = ParamGrid {
            tp_pcts: vec![0.005, 0.01],
            sl_pcts: vec![0.01, 0.02, 0.03],
            thresholds: vec![0.5, 0.6],
        };
        assert_eq!(grid.size(), 12);

        let configs = grid.generate_configs(&RunConfig::default());
        assert_eq!(configs.len(), 12);
        assert!(configs
            .iter()
            .all(|c| c.long_threshold == c.short_threshold));
        assert!(configs.iter().all(|c| c.horizon == 24)); // inherited
    }

    #[test]
    fn ranking_sorts_by_profit_factor_first() {
        let results = SweepResults {
            runs: vec![
                make_run(1.2, 80.0, 5),
                make_run(2.5, 40.0, 50),
                make_run(1.8, 60.0, 10),
            ],
        };
        let ranked = results.ranked();
        let pfs: Vec<f64> = ranked.iter().map(|r| r.result.profit_factor).collect();
        assert_eq!(pfs, vec![2.5, 1.8, 1.2]);
    }

    #[test]
    fn equal_profit_factor_ranks_higher_win_rate_first() {
        let results = SweepResults {
            runs: vec![make_run(2.0, 40.0, 5), make_run(2.0, 70.0, 5)],
        };
        let ranked = results.ranked();
        assert_eq!(ranked[0].result.win_rate, 70.0);
        assert_eq!(ranked[1].result.win_rate, 40.0);
    }

    #[test]
    fn full_tie_prefers_fewer_trades() {
        let results = SweepResults {
            runs: vec![make_run(2.0, 50.0, 40), make_run(2.0, 50.0, 8)],
        };
        let ranked = results.ranked();
        assert_eq!(ranked[0].result.trade_count(), 8);
        assert_eq!(ranked[1].result.trade_count(), 40);
    }

    #[test]
    fn infinite_profit_factor_ranks_on_top() {
        let results = SweepResults {
            runs: vec![make_run(3.0, 90.0, 10), make_run(f64::INFINITY, 10.0, 2)],
        };
        let ranked = results.ranked();
        assert_eq!(ranked[0].result.profit_factor, f64::INFINITY);
    }
}
