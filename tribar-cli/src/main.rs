//! TriBar CLI — label, run, and sweep commands.
//!
//! Commands:
//! - `label` — triple-barrier labels and class weights for a price CSV
//! - `run` — one backtest from a TOML config, price CSV, and probability CSV
//! - `sweep` — grid search over tp/sl/threshold, ranked table output
//! - `synth` — write a deterministic synthetic price CSV for demos

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tribar_core::domain::Label;
use tribar_core::engine::run_backtest;
use tribar_core::labeler::{class_weights, label as label_series, BarrierConfig};
use tribar_runner::export::{
    write_equity_csv, write_ranking_csv, write_result_json, write_trades_csv,
};
use tribar_runner::{
    decisions_from_probs, load_prices_csv, load_probs_csv, synthetic_series, ParamGrid,
    ParamSweep, RunConfig,
};

#[derive(Parser)]
#[command(name = "tribar", about = "TriBar — triple-barrier labeling and backtesting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute triple-barrier labels and class weights for a price CSV.
    Label {
        /// Price CSV (time,open,high,low,close,volume; epoch-ms time).
        prices: PathBuf,

        /// Take-profit distance as a fraction (0.01 = 1%).
        #[arg(long, default_value_t = 0.01)]
        tp: f64,

        /// Stop-loss distance as a fraction.
        #[arg(long, default_value_t = 0.01)]
        sl: f64,

        /// Horizon in bars.
        #[arg(long, default_value_t = 24)]
        horizon: usize,

        /// Optional output CSV of per-bar labels.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run one backtest from a TOML config.
    Run {
        /// Price CSV.
        prices: PathBuf,

        /// Per-bar class probability CSV (flat,long,short).
        probs: PathBuf,

        /// TOML run config.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for artifacts (trades/equity CSV, result JSON).
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Grid search over tp/sl/threshold combinations.
    Sweep {
        /// Price CSV.
        prices: PathBuf,

        /// Per-bar class probability CSV (flat,long,short).
        probs: PathBuf,

        /// Take-profit candidates.
        #[arg(long, value_delimiter = ',', default_value = "0.005,0.01,0.02")]
        tp: Vec<f64>,

        /// Stop-loss candidates.
        #[arg(long, value_delimiter = ',', default_value = "0.005,0.01,0.02")]
        sl: Vec<f64>,

        /// Entry-threshold candidates (applied to both sides).
        #[arg(long, value_delimiter = ',', default_value = "0.5,0.6,0.7")]
        threshold: Vec<f64>,

        /// Base TOML run config; grid axes override it.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Run combinations sequentially instead of in parallel.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Optional CSV export of the ranked table.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write a deterministic synthetic price CSV.
    Synth {
        /// Output path.
        out: PathBuf,

        /// Number of bars.
        #[arg(long, default_value_t = 1000)]
        bars: usize,

        /// RNG seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Label {
            prices,
            tp,
            sl,
            horizon,
            out,
        } => cmd_label(&prices, tp, sl, horizon, out.as_deref()),
        Commands::Run {
            prices,
            probs,
            config,
            output_dir,
        } => cmd_run(&prices, &probs, &config, &output_dir),
        Commands::Sweep {
            prices,
            probs,
            tp,
            sl,
            threshold,
            config,
            sequential,
            out,
        } => cmd_sweep(
            &prices,
            &probs,
            tp,
            sl,
            threshold,
            config.as_deref(),
            sequential,
            out.as_deref(),
        ),
        Commands::Synth { out, bars, seed } => cmd_synth(&out, bars, seed),
    }
}

fn cmd_label(
    prices: &std::path::Path,
    tp: f64,
    sl: f64,
    horizon: usize,
    out: Option<&std::path::Path>,
) -> Result<()> {
    let series = load_prices_csv(prices).context("loading price CSV")?;
    let config = BarrierConfig::new(tp, sl, horizon)?;
    let labels = label_series(&series, &config);
    let weights = class_weights(&labels);

    let count = |target: Label| labels.iter().filter(|&&l| l == target).count();
    println!("Bars:  {}", series.len());
    println!(
        "Flat:  {} | Long: {} | Short: {}",
        count(Label::Flat),
        count(Label::Long),
        count(Label::Short)
    );
    println!("Class weights:");
    let mut sorted: Vec<_> = weights.iter().collect();
    sorted.sort_by_key(|(l, _)| l.class_index());
    for (class, weight) in sorted {
        println!("  {:?}: {:.4}", class, weight);
    }

    if let Some(path) = out {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;
        writer.write_record(["bar", "label"])?;
        for (i, l) in labels.iter().enumerate() {
            writer.write_record([i.to_string(), l.class_index().to_string()])?;
        }
        writer.flush()?;
        println!("Labels written to {}", path.display());
    }
    Ok(())
}

fn cmd_run(
    prices: &std::path::Path,
    probs_path: &std::path::Path,
    config_path: &std::path::Path,
    output_dir: &std::path::Path,
) -> Result<()> {
    let series = load_prices_csv(prices).context("loading price CSV")?;
    let probs = load_probs_csv(probs_path).context("loading probability CSV")?;
    let config = RunConfig::from_toml_file(config_path).context("loading run config")?;

    if probs.len() != series.len() {
        bail!(
            "probability rows ({}) do not match price bars ({})",
            probs.len(),
            series.len()
        );
    }

    let decisions = decisions_from_probs(&probs, config.long_threshold, config.short_threshold);
    let result = run_backtest(&series, &decisions, &config.engine_config())?;

    println!("Run {}", config.run_id());
    println!("  bars:          {}", result.bar_count);
    println!("  trades:        {}", result.trade_count());
    println!("  final equity:  {:.2}", result.final_equity);
    println!("  profit factor: {}", format_pf(result.profit_factor));
    println!("  win rate:      {:.1}%", result.win_rate);
    println!("  max drawdown:  {:.2}%", result.max_drawdown_pct);

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    write_trades_csv(&result, &output_dir.join("trades.csv"))?;
    write_equity_csv(&result, &output_dir.join("equity.csv"))?;
    write_result_json(&result, &output_dir.join("result.json"))?;
    println!("Artifacts written to {}", output_dir.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_sweep(
    prices: &std::path::Path,
    probs_path: &std::path::Path,
    tp: Vec<f64>,
    sl: Vec<f64>,
    threshold: Vec<f64>,
    config_path: Option<&std::path::Path>,
    sequential: bool,
    out: Option<&std::path::Path>,
) -> Result<()> {
    let series = load_prices_csv(prices).context("loading price CSV")?;
    let probs = load_probs_csv(probs_path).context("loading probability CSV")?;
    let base = match config_path {
        Some(path) => RunConfig::from_toml_file(path).context("loading base run config")?,
        None => RunConfig::default(),
    };

    let grid = ParamGrid {
        tp_pcts: tp,
        sl_pcts: sl,
        thresholds: threshold,
    };
    println!("Sweeping {} combinations...", grid.size());

    let results = ParamSweep::new(&series, &probs)
        .with_parallelism(!sequential)
        .sweep(&grid, &base)?;
    let ranked = results.ranked();

    println!(
        "{:>4}  {:>7}  {:>7}  {:>5}  {:>8}  {:>7}  {:>7}  {:>6}",
        "rank", "tp", "sl", "thr", "pf", "win%", "dd%", "trades"
    );
    for (rank, run) in ranked.iter().enumerate().take(20) {
        println!(
            "{:>4}  {:>7.4}  {:>7.4}  {:>5.2}  {:>8}  {:>7.1}  {:>7.2}  {:>6}",
            rank + 1,
            run.config.tp_pct,
            run.config.sl_pct,
            run.config.long_threshold,
            format_pf(run.result.profit_factor),
            run.result.win_rate,
            run.result.max_drawdown_pct,
            run.result.trade_count(),
        );
    }

    if let Some(path) = out {
        write_ranking_csv(&ranked, path)?;
        println!("Ranking written to {}", path.display());
    }
    Ok(())
}

fn cmd_synth(out: &std::path::Path, bars: usize, seed: u64) -> Result<()> {
    let series = synthetic_series(seed, bars);
    let mut writer =
        csv::Writer::from_path(out).with_context(|| format!("creating {}", out.display()))?;
    writer.write_record(["time", "open", "high", "low", "close", "volume"])?;
    for bar in series.bars() {
        writer.write_record([
            bar.timestamp.timestamp_millis().to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }
    writer.flush()?;
    println!("Wrote {} synthetic bars to {}", bars, out.display());
    Ok(())
}

fn format_pf(pf: f64) -> String {
    if pf.is_infinite() {
        "inf".to_string()
    } else {
        format!("{pf:.3}")
    }
}
