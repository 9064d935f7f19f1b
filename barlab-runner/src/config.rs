//! Serializable backtest configuration.
//!
//! A `BacktestConfig` captures everything needed to reproduce a run:
//! instrument, date range, strategy windows, execution costs, risk limits,
//! and starting cash. Configs load from TOML and hash to a deterministic
//! run ID, so two identical configs always name the same run.

use barlab_core::{EngineError, ExecutionModel, MaCrossoverParams, RiskLimits};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Unique identifier for a run configuration (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse TOML config: {0}")]
    Parse(String),

    #[error("ticker must not be empty")]
    EmptyTicker,

    #[error("start date {start} is after end date {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid parameter: {0}")]
    Invalid(#[from] EngineError),
}

/// Complete configuration for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Stooq symbol, e.g. `aapl.us`, `spy.us`.
    pub ticker: String,

    /// Backtest start date (inclusive). Defaults to the whole history.
    #[serde(default)]
    pub start: Option<NaiveDate>,

    /// Backtest end date (inclusive).
    #[serde(default)]
    pub end: Option<NaiveDate>,

    #[serde(default)]
    pub strategy: StrategyConfig,

    #[serde(default)]
    pub execution: ExecutionConfig,

    #[serde(default)]
    pub risk: RiskConfig,

    /// Starting cash.
    #[serde(default = "default_initial_cash")]
    pub initial_cash: f64,
}

/// Moving-average crossover windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub fast: usize,
    pub slow: usize,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self { fast: 20, slow: 100 }
    }
}

impl StrategyConfig {
    pub fn params(&self) -> Result<MaCrossoverParams, EngineError> {
        MaCrossoverParams::new(self.fast, self.slow)
    }
}

/// Execution cost settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Slippage in basis points (1 bp = 0.01%).
    pub slippage_bps: f64,
    /// Fixed commission per trade.
    pub commission: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            slippage_bps: 2.0,
            commission: 1.0,
        }
    }
}

impl ExecutionConfig {
    pub fn model(&self) -> Result<ExecutionModel, EngineError> {
        ExecutionModel::new(self.slippage_bps, self.commission)
    }
}

/// Risk limit settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Max position value as a fraction of equity, in (0, 1].
    pub max_position_pct: f64,
    /// Drawdown fraction at which the kill switch trips, in (0, 1].
    pub max_drawdown: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_position_pct: 0.25,
            max_drawdown: 0.20,
        }
    }
}

impl RiskConfig {
    pub fn limits(&self) -> Result<RiskLimits, EngineError> {
        RiskLimits::new(self.max_position_pct, self.max_drawdown)
    }
}

fn default_initial_cash() -> f64 {
    100_000.0
}

impl BacktestConfig {
    /// A config for `ticker` with every other field at its default.
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            start: None,
            end: None,
            strategy: StrategyConfig::default(),
            execution: ExecutionConfig::default(),
            risk: RiskConfig::default(),
            initial_cash: default_initial_cash(),
        }
    }

    /// Loads and validates a config from a TOML file.
    pub fn from_toml_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field the engine would reject, so a bad config fails
    /// here with a named field instead of deep inside a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticker.trim().is_empty() {
            return Err(ConfigError::EmptyTicker);
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(ConfigError::InvertedDateRange { start, end });
            }
        }
        self.strategy.params()?;
        self.execution.model()?;
        self.risk.limits()?;
        if !self.initial_cash.is_finite() || self.initial_cash <= 0.0 {
            return Err(ConfigError::Invalid(EngineError::InvalidInitialCash(
                self.initial_cash,
            )));
        }
        Ok(())
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs have the same RunId, which makes
    /// result artifacts traceable back to the exact parameters that
    /// produced them.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("BacktestConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
