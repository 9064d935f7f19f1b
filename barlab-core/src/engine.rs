//! Bar-by-bar simulation loop — the heart of the engine.
//!
//! Two-phase discipline per bar:
//! 1. Mark-to-market at this bar's close (risk state first, always).
//! 2. Execute the target decided on the *previous* bar at this bar's open.
//! 3. Record this bar's signal target as pending for the *next* bar.
//!
//! A signal observed at bar t's close is therefore only ever acted on at
//! bar t+1's open; the pending target set on the final bar is never
//! executed because no next bar exists. Both are intentional.

use crate::domain::{Bar, EquitySnapshot, RiskLimits, Trade, TradeSide};
use crate::error::EngineError;
use crate::execution::ExecutionModel;
use crate::portfolio::Portfolio;

/// Everything the loop needs besides bars and targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub initial_cash: f64,
    pub limits: RiskLimits,
    pub execution: ExecutionModel,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_cash: 100_000.0,
            limits: RiskLimits::default(),
            execution: ExecutionModel::default(),
        }
    }
}

/// Output of a run: the two append-only logs plus summary scalars.
///
/// An empty trade log is a valid result, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub equity_curve: Vec<EquitySnapshot>,
    pub trades: Vec<Trade>,
    pub final_equity: f64,
    pub bar_count: usize,
}

/// Runs the simulation over a bar sequence and its aligned target series.
///
/// Preconditions are fatal and checked before the loop starts: bars must
/// be non-empty with strictly increasing dates and positive finite
/// prices, targets must align one-to-one with bars, and every target must
/// be 0 or 1 (the engine is long-only).
pub fn run_simulation(
    bars: &[Bar],
    targets: &[i8],
    config: &SimulationConfig,
) -> Result<RunResult, EngineError> {
    validate_bars(bars)?;
    if targets.len() != bars.len() {
        return Err(EngineError::TargetLengthMismatch {
            targets: targets.len(),
            bars: bars.len(),
        });
    }
    if let Some(&bad) = targets.iter().find(|&&t| !matches!(t, 0 | 1)) {
        return Err(EngineError::InvalidTarget(bad));
    }

    let mut portfolio = Portfolio::new(config.initial_cash, config.limits)?;
    let mut pending_target: Option<i8> = None;

    for (bar, &target) in bars.iter().zip(targets) {
        // Phase 1: risk state first, at this bar's close, trade or no trade.
        portfolio.mark_to_market(bar.date, bar.close);

        // Phase 2: execute the previous bar's decision at this bar's open.
        if let Some(pending) = pending_target {
            if !portfolio.kill_switch() {
                execute_pending(&mut portfolio, pending, bar, &config.execution);
            }
        }

        // Phase 3: this bar's signal becomes the next bar's order.
        pending_target = Some(target);
    }

    let final_equity = portfolio
        .equity_curve()
        .last()
        .map(|snap| snap.equity)
        .unwrap_or(config.initial_cash);
    let bar_count = bars.len();
    let (equity_curve, trades) = portfolio.into_logs();

    Ok(RunResult {
        equity_curve,
        trades,
        final_equity,
        bar_count,
    })
}

/// Executes one pending target at a bar's open.
///
/// The side is derived from the same sizing function the portfolio uses
/// internally, so the slippage direction always matches the executed
/// delta. A zero delta makes no execution-model call at all: no trade,
/// no slippage, no commission. Inputs are pre-validated by the loop's
/// preconditions; if a call still fails, only this bar's trade attempt is
/// dropped and the run continues.
fn execute_pending(
    portfolio: &mut Portfolio,
    target: i8,
    bar: &Bar,
    execution: &ExecutionModel,
) {
    let Ok(desired) = portfolio.desired_quantity(target, bar.open) else {
        return;
    };
    let delta = desired as i64 - portfolio.position_qty() as i64;
    if delta == 0 {
        return;
    }

    let side = if delta > 0 {
        TradeSide::Buy
    } else {
        TradeSide::Sell
    };
    let Ok((fill_price, commission)) = execution.fill(bar.open, side, delta.unsigned_abs()) else {
        return;
    };
    let _ = portfolio.rebalance_to_target(bar.date, target, bar.open, fill_price, commission);
}

fn validate_bars(bars: &[Bar]) -> Result<(), EngineError> {
    if bars.is_empty() {
        return Err(EngineError::InsufficientData {
            required: 1,
            available: 0,
        });
    }
    for (i, bar) in bars.iter().enumerate() {
        let prices = [bar.open, bar.high, bar.low, bar.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(EngineError::MalformedBar(i));
        }
        if i > 0 && bars[i - 1].date >= bar.date {
            return Err(EngineError::UnsortedBars(i));
        }
    }
    Ok(())
}
