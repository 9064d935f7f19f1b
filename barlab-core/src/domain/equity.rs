//! Equity snapshot — one ledger row per bar, append-only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Portfolio state observed at a bar's close.
///
/// Exactly one snapshot is recorded per bar processed, in bar order.
/// `equity == cash + position_qty * close` and `drawdown` is the fractional
/// decline from the running equity peak (0 when the peak is 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquitySnapshot {
    pub date: NaiveDate,
    pub cash: f64,
    pub position_qty: u64,
    pub close: f64,
    pub equity: f64,
    pub drawdown: f64,
    pub kill_switch: bool,
}
