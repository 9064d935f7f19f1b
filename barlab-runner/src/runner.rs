//! Backtest drivers — single runs and parallel batches.
//!
//! A run is: sufficiency check → target generation → core simulation →
//! metrics. The core owns all simulation state; this layer never touches
//! portfolio internals, it only wires validated inputs through and
//! packages the outputs.

use anyhow::{ensure, Context, Result};
use barlab_core::domain::{Bar, EquitySnapshot, Trade};
use barlab_core::{crossover_targets, run_simulation, SignalMode, SimulationConfig};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{BacktestConfig, RunId};
use crate::metrics::PerformanceMetrics;

/// Everything a finished run produces, ready for artifacts or inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    /// Content hash of the config that produced this report.
    pub run_id: RunId,
    pub ticker: String,
    pub equity_curve: Vec<EquitySnapshot>,
    pub trades: Vec<Trade>,
    pub metrics: PerformanceMetrics,
    pub final_equity: f64,
    pub bar_count: usize,
    pub kill_switch_triggered: bool,
}

/// One unit of work for `run_batch`.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub config: BacktestConfig,
    pub bars: Vec<Bar>,
}

/// Runs a single backtest over pre-loaded bars.
///
/// The data-sufficiency check is a precondition: too few bars for the
/// configured windows aborts here, before any simulation state exists.
pub fn run_backtest(config: &BacktestConfig, bars: &[Bar]) -> Result<BacktestReport> {
    config
        .validate()
        .with_context(|| format!("invalid config for '{}'", config.ticker))?;

    let params = config.strategy.params()?;
    ensure!(
        bars.len() >= params.min_bars(),
        "not enough data for MA({},{}): need at least {} bars, got {}",
        config.strategy.fast,
        config.strategy.slow,
        params.min_bars(),
        bars.len()
    );

    let targets = crossover_targets(bars, &params, SignalMode::LongOnly);

    let sim_config = SimulationConfig {
        initial_cash: config.initial_cash,
        limits: config.risk.limits()?,
        execution: config.execution.model()?,
    };
    let result = run_simulation(bars, &targets, &sim_config)
        .with_context(|| format!("simulation failed for '{}'", config.ticker))?;

    let metrics = PerformanceMetrics::compute(&result.equity_curve);
    let kill_switch_triggered = result
        .equity_curve
        .last()
        .map(|snap| snap.kill_switch)
        .unwrap_or(false);

    Ok(BacktestReport {
        run_id: config.run_id(),
        ticker: config.ticker.clone(),
        equity_curve: result.equity_curve,
        trades: result.trades,
        metrics,
        final_equity: result.final_equity,
        bar_count: result.bar_count,
        kill_switch_triggered,
    })
}

/// Runs a batch of backtests in parallel.
///
/// Each job gets its own simulation with independently-owned portfolio
/// state — nothing is shared across worker threads — so batch results
/// are identical to running the jobs sequentially. Results come back in
/// input order.
pub fn run_batch(jobs: &[BatchJob]) -> Vec<Result<BacktestReport>> {
    jobs.par_iter()
        .map(|job| run_backtest(&job.config, &job.bars))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic_bars;

    fn small_config() -> BacktestConfig {
        let mut config = BacktestConfig::new("test.us");
        config.strategy.fast = 5;
        config.strategy.slow = 20;
        config
    }

    #[test]
    fn report_is_internally_consistent() {
        let bars = synthetic_bars(300, 7);
        let report = run_backtest(&small_config(), &bars).unwrap();

        assert_eq!(report.bar_count, 300);
        assert_eq!(report.equity_curve.len(), 300);
        assert_eq!(report.ticker, "test.us");
        assert_eq!(report.run_id, small_config().run_id());
        assert_eq!(
            report.final_equity,
            report.equity_curve.last().unwrap().equity
        );
        assert_eq!(
            report.kill_switch_triggered,
            report.equity_curve.last().unwrap().kill_switch
        );
        assert_eq!(
            report.metrics,
            PerformanceMetrics::compute(&report.equity_curve)
        );
    }

    #[test]
    fn insufficient_data_fails_before_simulation() {
        let bars = synthetic_bars(10, 7); // min_bars for MA(5,20) is 22
        let err = run_backtest(&small_config(), &bars).unwrap_err();
        assert!(err.to_string().contains("not enough data"));
    }

    #[test]
    fn invalid_config_fails_fast() {
        let bars = synthetic_bars(300, 7);
        let mut config = small_config();
        config.risk.max_drawdown = 2.0;
        assert!(run_backtest(&config, &bars).is_err());
    }

    #[test]
    fn batch_matches_sequential_runs() {
        let jobs: Vec<BatchJob> = (0..4)
            .map(|seed| BatchJob {
                config: small_config(),
                bars: synthetic_bars(250, seed),
            })
            .collect();

        let parallel = run_batch(&jobs);
        for (job, result) in jobs.iter().zip(&parallel) {
            let sequential = run_backtest(&job.config, &job.bars).unwrap();
            let parallel_report = result.as_ref().unwrap();
            assert_eq!(parallel_report, &sequential);
        }
    }

    #[test]
    fn batch_reports_per_job_failures() {
        let jobs = vec![
            BatchJob {
                config: small_config(),
                bars: synthetic_bars(250, 1),
            },
            BatchJob {
                config: small_config(),
                bars: synthetic_bars(3, 1), // too short
            },
        ];
        let results = run_batch(&jobs);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
