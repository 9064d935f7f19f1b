//! Engine error types.
//!
//! Every variant here is an invalid-input or precondition failure: fatal at
//! the call site, never coerced. Two situations that look like errors are
//! not: an unaffordable buy (clamped or skipped inside the portfolio) and a
//! drawdown breach (a kill-switch state transition).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("price must be positive and finite, got {0}")]
    InvalidPrice(f64),

    #[error("quantity must be positive")]
    InvalidQuantity,

    #[error("target position must be 0 or 1 in long-only mode, got {0}")]
    InvalidTarget(i8),

    #[error("initial cash must be positive and finite, got {0}")]
    InvalidInitialCash(f64),

    #[error("{name} must be in (0, 1], got {value}")]
    LimitOutOfRange { name: &'static str, value: f64 },

    #[error("{name} must be non-negative and finite, got {value}")]
    InvalidCost { name: &'static str, value: f64 },

    #[error("moving average window must be >= 1")]
    InvalidWindow,

    #[error("bar dates must be strictly increasing (violated at index {0})")]
    UnsortedBars(usize),

    #[error("bar at index {0} has a non-positive or non-finite price")]
    MalformedBar(usize),

    #[error("target series has {targets} entries for {bars} bars")]
    TargetLengthMismatch { targets: usize, bars: usize },

    #[error("need at least {required} bars, got {available}")]
    InsufficientData { required: usize, available: usize },
}
