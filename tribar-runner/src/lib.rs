//! TriBar Runner — orchestration around the core engine.
//!
//! - CSV loading of price series and model probability matrices
//! - Threshold decision policy (probabilities → per-bar decisions)
//! - Serializable run configuration with content-addressed run IDs
//! - Parallel grid sweep with deterministic three-key ranking
//! - Artifact export (trades CSV, equity CSV, result JSON)

pub mod config;
pub mod data_loader;
pub mod export;
pub mod policy;
pub mod sweep;

pub use config::RunConfig;
pub use data_loader::{load_prices_csv, load_probs_csv, synthetic_series, LoadError};
pub use policy::{decisions_from_probs, ClassProbs};
pub use sweep::{ParamGrid, ParamSweep, RankedRun, SweepResults};
