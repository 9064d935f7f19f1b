//! BarLab Core — the event-driven backtesting engine.
//!
//! This crate contains the simulation core and nothing else:
//! - Domain types (bars, trades, equity snapshots, risk limits)
//! - Trailing moving-average indicator
//! - MA-crossover target-position signal generator
//! - Execution model (directional slippage + fixed commission)
//! - Portfolio ledger with drawdown kill switch
//! - Bar-by-bar simulation loop with one-bar execution lag
//!
//! No I/O, no network, no clocks, no randomness. Given identical bars and
//! parameters, a run produces byte-identical equity curves and trade logs.

pub mod domain;
pub mod engine;
pub mod error;
pub mod execution;
pub mod indicators;
pub mod portfolio;
pub mod signal;

pub use domain::{Bar, EquitySnapshot, RiskLimits, Trade, TradeSide};
pub use engine::{run_simulation, RunResult, SimulationConfig};
pub use error::EngineError;
pub use execution::ExecutionModel;
pub use portfolio::Portfolio;
pub use signal::{crossover_targets, MaCrossoverParams, SignalMode};
