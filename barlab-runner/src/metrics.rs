//! Performance metrics — pure functions over the recorded equity curve.
//!
//! Every metric is a pure function: snapshots in, scalar out. No
//! dependencies on the runner, data layer, or engine internals.

use barlab_core::domain::EquitySnapshot;
use serde::{Deserialize, Serialize};

/// Trading days per year used for annualization.
const TRADING_DAYS: f64 = 252.0;

/// Aggregate performance statistics for a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub cagr: f64,
    pub annualized_vol: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
}

impl PerformanceMetrics {
    /// Computes all metrics from an equity curve.
    ///
    /// Degenerate inputs (fewer than two snapshots, zero variance) yield
    /// zeros, not errors.
    pub fn compute(equity_curve: &[EquitySnapshot]) -> Self {
        Self {
            total_return: total_return(equity_curve),
            cagr: cagr(equity_curve),
            annualized_vol: annualized_vol(equity_curve),
            sharpe: sharpe(equity_curve),
            max_drawdown: max_drawdown(equity_curve),
        }
    }
}

/// Total return as a fraction: final / initial - 1.
pub fn total_return(equity_curve: &[EquitySnapshot]) -> f64 {
    let (Some(first), Some(last)) = (equity_curve.first(), equity_curve.last()) else {
        return 0.0;
    };
    if equity_curve.len() < 2 || first.equity <= 0.0 {
        return 0.0;
    }
    last.equity / first.equity - 1.0
}

/// Compound annual growth rate on a calendar-year basis.
///
/// Years are measured from the first to the last snapshot date; a span
/// too short to measure returns 0.
pub fn cagr(equity_curve: &[EquitySnapshot]) -> f64 {
    let (Some(first), Some(last)) = (equity_curve.first(), equity_curve.last()) else {
        return 0.0;
    };
    if equity_curve.len() < 2 || first.equity <= 0.0 || last.equity <= 0.0 {
        return 0.0;
    }
    let days = (last.date - first.date).num_days() as f64;
    let years = days / 365.25;
    if years <= 0.0 {
        return 0.0;
    }
    (last.equity / first.equity).powf(1.0 / years) - 1.0
}

/// Annualized volatility: sample standard deviation of daily returns
/// scaled by sqrt(252). Fewer than two returns yields 0.
pub fn annualized_vol(equity_curve: &[EquitySnapshot]) -> f64 {
    let returns = daily_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    sample_std(&returns) * TRADING_DAYS.sqrt()
}

/// Annualized Sharpe ratio from daily returns (risk-free rate 0).
///
/// Returns 0 when the return variance is 0.
pub fn sharpe(equity_curve: &[EquitySnapshot]) -> f64 {
    let returns = daily_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let std = sample_std(&returns);
    if std <= 0.0 {
        return 0.0;
    }
    (mean(&returns) / std) * TRADING_DAYS.sqrt()
}

/// Maximum drawdown over the run, read from the recorded per-bar
/// drawdowns (the ledger already tracks distance from the running peak).
pub fn max_drawdown(equity_curve: &[EquitySnapshot]) -> f64 {
    equity_curve
        .iter()
        .map(|snap| snap.drawdown)
        .fold(0.0, f64::max)
}

fn daily_returns(equity_curve: &[EquitySnapshot]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .filter(|w| w[0].equity > 0.0)
        .map(|w| w[1].equity / w[0].equity - 1.0)
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof = 1).
fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}
