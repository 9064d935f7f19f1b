//! BarLab Runner — backtest orchestration around the core engine.
//!
//! This crate builds on `barlab-core` to provide:
//! - Serializable run configuration (TOML) with content-addressed run IDs
//! - Market data loading: Stooq CSV download, local cache, synthetic fallback
//! - Performance metrics over the recorded equity curve
//! - Flat output artifacts (equity/trade CSVs, metrics JSON)
//! - Single-run and parallel batch drivers

pub mod config;
pub mod data;
pub mod metrics;
pub mod report;
pub mod runner;

pub use config::{BacktestConfig, ConfigError, ExecutionConfig, RiskConfig, RunId, StrategyConfig};
pub use data::{
    download_stooq_csv, filter_date_range, load_bars_csv, stooq_csv_url, synthetic_bars, DataError,
};
pub use metrics::PerformanceMetrics;
pub use report::{save_artifacts, ArtifactPaths};
pub use runner::{run_backtest, run_batch, BacktestReport, BatchJob};
