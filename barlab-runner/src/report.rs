//! Output artifacts — flat CSV and JSON files consumed by reporting.
//!
//! Three files per run: the equity curve (one row per bar), the trade
//! tape (one row per executed trade; header-only when no trade fired),
//! and the summary metrics as pretty JSON.

use anyhow::{Context, Result};
use barlab_core::domain::{EquitySnapshot, Trade};
use std::path::{Path, PathBuf};

use crate::metrics::PerformanceMetrics;
use crate::runner::BacktestReport;

/// Where a run's artifacts landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub equity_csv: PathBuf,
    pub trades_csv: PathBuf,
    pub metrics_json: PathBuf,
}

/// Writes all artifacts for a report into `out_dir` (created if missing).
pub fn save_artifacts(out_dir: &Path, report: &BacktestReport) -> Result<ArtifactPaths> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output dir {}", out_dir.display()))?;

    let paths = ArtifactPaths {
        equity_csv: out_dir.join("equity_curve.csv"),
        trades_csv: out_dir.join("trades.csv"),
        metrics_json: out_dir.join("metrics.json"),
    };
    write_equity_csv(&paths.equity_csv, &report.equity_curve)?;
    write_trades_csv(&paths.trades_csv, &report.trades)?;
    write_metrics_json(&paths.metrics_json, &report.metrics)?;
    Ok(paths)
}

/// Equity curve as CSV: one row per bar, in bar order.
pub fn write_equity_csv(path: &Path, equity_curve: &[EquitySnapshot]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create equity CSV {}", path.display()))?;

    wtr.write_record([
        "date",
        "cash",
        "position_qty",
        "close",
        "equity",
        "drawdown",
        "kill_switch",
    ])?;
    for snap in equity_curve {
        wtr.write_record([
            snap.date.to_string(),
            format!("{:.4}", snap.cash),
            snap.position_qty.to_string(),
            format!("{:.4}", snap.close),
            format!("{:.4}", snap.equity),
            format!("{:.6}", snap.drawdown),
            snap.kill_switch.to_string(),
        ])?;
    }
    wtr.flush()
        .with_context(|| format!("failed to write equity CSV {}", path.display()))?;
    Ok(())
}

/// Trade tape as CSV. Zero trades produces a header-only file — a valid
/// empty artifact, not an error.
pub fn write_trades_csv(path: &Path, trades: &[Trade]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create trades CSV {}", path.display()))?;

    wtr.write_record(["date", "side", "qty", "price", "notional", "commission"])?;
    for trade in trades {
        wtr.write_record([
            trade.date.to_string(),
            trade.side.to_string(),
            trade.qty.to_string(),
            format!("{:.4}", trade.price),
            format!("{:.4}", trade.notional),
            format!("{:.4}", trade.commission),
        ])?;
    }
    wtr.flush()
        .with_context(|| format!("failed to write trades CSV {}", path.display()))?;
    Ok(())
}

/// Summary metrics as pretty JSON.
pub fn write_metrics_json(path: &Path, metrics: &PerformanceMetrics) -> Result<()> {
    let json = serde_json::to_string_pretty(metrics).context("failed to serialize metrics")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write metrics JSON {}", path.display()))?;
    Ok(())
}
