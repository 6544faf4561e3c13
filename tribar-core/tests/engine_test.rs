//! Integration tests for the backtest engine state machine.

use chrono::{Duration, TimeZone, Utc};
use tribar_core::domain::{Bar, ExitReason, PriceSeries, Side};
use tribar_core::engine::{run_backtest, BacktestConfig, Decision, EngineError};

fn make_series(ohlc: &[(f64, f64, f64, f64)]) -> PriceSeries {
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let bars = ohlc
        .iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            timestamp: base + Duration::minutes(i as i64),
            open,
            high,
            low,
            close,
            volume: 1_000.0,
        })
        .collect();
    PriceSeries::from_bars(bars).unwrap()
}

fn flat_series(n: usize, price: f64) -> PriceSeries {
    make_series(&vec![(price, price, price, price); n])
}

/// Frictionless config so exit prices and PnL are exact.
fn frictionless(tp_pct: f64, sl_pct: f64, horizon: usize) -> BacktestConfig {
    BacktestConfig {
        tp_pct,
        sl_pct,
        horizon,
        fee_pct: 0.0,
        slippage_pct: 0.0,
        position_fraction: 1.0,
        initial_equity: 10_000.0,
    }
}

fn hold(n: usize) -> Vec<Decision> {
    vec![Decision::Hold; n]
}

fn enter_at(n: usize, bar: usize, side: Side) -> Vec<Decision> {
    let mut decisions = hold(n);
    decisions[bar] = Decision::Enter {
        side,
        confidence: 0.9,
    };
    decisions
}

#[test]
fn no_decisions_means_no_trades() {
    let series = flat_series(50, 100.0);
    let config = frictionless(0.01, 0.01, 10);
    let result = run_backtest(&series, &hold(50), &config).unwrap();

    assert!(result.trades.is_empty());
    assert_eq!(result.equity_curve.len(), 50);
    assert!(result.equity_curve.iter().all(|&e| e == 10_000.0));
    assert_eq!(result.final_equity, 10_000.0);
    assert_eq!(result.win_rate, 0.0);
    assert_eq!(result.profit_factor, f64::INFINITY);
    assert_eq!(result.max_drawdown_pct, 0.0);
}

#[test]
fn long_take_profit_first_touch() {
    // Entry at bar 10 (close 100); bar 12's high breaches TP 101 with the
    // low nowhere near SL 99.
    let mut ohlc = vec![(100.0, 100.2, 99.8, 100.0); 20];
    ohlc[12] = (100.0, 101.5, 99.9, 101.2);
    let series = make_series(&ohlc);
    let config = frictionless(0.01, 0.01, 10);
    let decisions = enter_at(20, 10, Side::Long);

    let result = run_backtest(&series, &decisions, &config).unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.exit_reason, ExitReason::TakeProfit);
    assert_eq!(trade.entry_bar, 10);
    assert_eq!(trade.exit_bar, 12);
    assert_eq!(trade.bars_held, 2);
    assert!((trade.exit_price - 101.0).abs() < 1e-9);
    assert!((trade.pnl_pct - 0.01).abs() < 1e-9);
    assert!((result.final_equity - 10_100.0).abs() < 1e-6);
}

#[test]
fn same_bar_ambiguity_exits_at_stop_loss() {
    // Bar 1 breaches both barriers; the stop-loss must win.
    let ohlc = vec![
        (100.0, 100.2, 99.8, 100.0),
        (100.0, 102.0, 97.0, 100.0),
        (100.0, 100.2, 99.8, 100.0),
    ];
    let series = make_series(&ohlc);
    let config = frictionless(0.01, 0.01, 10);
    let decisions = enter_at(3, 0, Side::Long);

    let result = run_backtest(&series, &decisions, &config).unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.exit_reason, ExitReason::StopLoss);
    assert_eq!(trade.exit_bar, 1);
    assert!((trade.exit_price - 99.0).abs() < 1e-9);
    assert!((trade.pnl_pct + 0.01).abs() < 1e-9);
}

#[test]
fn short_take_profit_on_falling_price() {
    let mut ohlc = vec![(100.0, 100.2, 99.8, 100.0); 10];
    ohlc[3] = (99.8, 99.9, 98.5, 98.7); // low breaches short TP at 99.0
    let series = make_series(&ohlc);
    let config = frictionless(0.01, 0.02, 8);
    let decisions = enter_at(10, 0, Side::Short);

    let result = run_backtest(&series, &decisions, &config).unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.side, Side::Short);
    assert_eq!(trade.exit_reason, ExitReason::TakeProfit);
    assert_eq!(trade.exit_bar, 3);
    assert!((trade.pnl_pct - 0.01).abs() < 1e-9);
}

#[test]
fn horizon_force_close_at_close() {
    let series = flat_series(20, 100.0);
    let config = frictionless(0.05, 0.05, 4);
    let decisions = enter_at(20, 2, Side::Long);

    let result = run_backtest(&series, &decisions, &config).unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.exit_reason, ExitReason::Horizon);
    assert_eq!(trade.exit_bar, 6);
    assert_eq!(trade.bars_held, 4);
    assert!((trade.pnl_pct).abs() < 1e-12);
}

#[test]
fn end_of_series_force_closes_open_position() {
    let series = flat_series(10, 100.0);
    let config = frictionless(0.05, 0.05, 50);
    let decisions = enter_at(10, 7, Side::Long);

    let result = run_backtest(&series, &decisions, &config).unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.exit_reason, ExitReason::EndOfData);
    assert_eq!(trade.exit_bar, 9);
}

#[test]
fn fees_and_slippage_are_strictly_adverse() {
    let series = flat_series(10, 100.0);
    let config = BacktestConfig {
        tp_pct: 0.05,
        sl_pct: 0.05,
        horizon: 4,
        fee_pct: 0.001,
        slippage_pct: 0.0005,
        position_fraction: 1.0,
        initial_equity: 10_000.0,
    };
    let decisions = enter_at(10, 0, Side::Long);

    let result = run_backtest(&series, &decisions, &config).unwrap();

    // Price never moved, so the trade loses exactly the round-trip friction:
    // entry at 100 * 1.0005, exit at 100 * 0.9995, minus two fees.
    let trade = &result.trades[0];
    let expected = (99.95 - 100.05) / 100.05 - 0.002;
    assert!((trade.pnl_pct - expected).abs() < 1e-12);
    assert!(trade.pnl_pct < 0.0);
    assert!(result.final_equity < 10_000.0);
}

#[test]
fn short_friction_is_also_adverse() {
    let series = flat_series(10, 100.0);
    let config = BacktestConfig {
        tp_pct: 0.05,
        sl_pct: 0.05,
        horizon: 4,
        fee_pct: 0.0,
        slippage_pct: 0.001,
        position_fraction: 1.0,
        initial_equity: 10_000.0,
    };
    let decisions = enter_at(10, 0, Side::Short);

    let result = run_backtest(&series, &decisions, &config).unwrap();
    // Short sells at 99.9, buys back at 100.1: a loss despite a flat price.
    assert!(result.trades[0].pnl_pct < 0.0);
}

#[test]
fn position_fraction_scales_equity_update() {
    let mut ohlc = vec![(100.0, 100.2, 99.8, 100.0); 10];
    ohlc[2] = (100.0, 101.5, 99.9, 101.2);
    let series = make_series(&ohlc);
    let mut config = frictionless(0.01, 0.01, 8);
    config.position_fraction = 0.5;
    let decisions = enter_at(10, 0, Side::Long);

    let result = run_backtest(&series, &decisions, &config).unwrap();
    // +1% trade at half exposure moves equity by +0.5%.
    assert!((result.final_equity - 10_050.0).abs() < 1e-6);
}

#[test]
fn at_most_one_position_at_a_time() {
    // Enter signals on every bar; the engine may only act on them while flat.
    let series = flat_series(30, 100.0);
    let config = frictionless(0.05, 0.05, 3);
    let decisions: Vec<Decision> = (0..30)
        .map(|_| Decision::Enter {
            side: Side::Long,
            confidence: 1.0,
        })
        .collect();

    let result = run_backtest(&series, &decisions, &config).unwrap();

    assert!(!result.trades.is_empty());
    for pair in result.trades.windows(2) {
        // The next entry can only happen on a bar strictly after the
        // previous exit: no overlap, no pyramiding.
        assert!(pair[1].entry_bar > pair[0].exit_bar);
    }
}

#[test]
fn identical_inputs_yield_identical_results() {
    let mut ohlc = vec![(100.0, 100.4, 99.6, 100.1); 40];
    ohlc[5] = (100.1, 101.4, 99.9, 101.0);
    ohlc[20] = (100.0, 100.3, 98.4, 98.6);
    let series = make_series(&ohlc);
    let config = BacktestConfig::default();
    let decisions = enter_at(40, 3, Side::Long);

    let a = run_backtest(&series, &decisions, &config).unwrap();
    let b = run_backtest(&series, &decisions, &config).unwrap();

    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn bad_config_fails_before_simulation() {
    let series = flat_series(10, 100.0);
    let mut config = BacktestConfig::default();
    config.horizon = 0;
    let err = run_backtest(&series, &hold(10), &config).unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
}

#[test]
fn decision_length_mismatch_is_rejected() {
    let series = flat_series(10, 100.0);
    let config = BacktestConfig::default();
    let err = run_backtest(&series, &hold(7), &config).unwrap_err();
    assert!(matches!(
        err,
        EngineError::DecisionLengthMismatch {
            decisions: 7,
            bars: 10
        }
    ));
}

#[test]
fn empty_series_produces_empty_result() {
    let series = PriceSeries::from_bars(vec![]).unwrap();
    let config = BacktestConfig::default();
    let result = run_backtest(&series, &[], &config).unwrap();
    assert!(result.trades.is_empty());
    assert!(result.equity_curve.is_empty());
    assert_eq!(result.final_equity, config.initial_equity);
}
