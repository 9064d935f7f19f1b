//! Trade — one executed order, append-only.

use super::side::TradeSide;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single executed trade. `notional` is always the exact product
/// `qty * price`; commission is carried separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub side: TradeSide,
    pub qty: u64,
    pub price: f64,
    pub notional: f64,
    pub commission: f64,
}

impl Trade {
    /// Builds a trade record, deriving notional from qty and price.
    ///
    /// Callers guarantee `qty > 0` and `price > 0`; the portfolio never
    /// constructs a trade otherwise.
    pub fn new(date: NaiveDate, side: TradeSide, qty: u64, price: f64, commission: f64) -> Self {
        debug_assert!(qty > 0, "trade qty must be positive");
        debug_assert!(price > 0.0, "trade price must be positive");
        Self {
            date,
            side,
            qty,
            price,
            notional: qty as f64 * price,
            commission,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn notional_is_exact_product() {
        let trade = Trade::new(date(), TradeSide::Buy, 500, 50.0, 1.0);
        assert_eq!(trade.notional, 25_000.0);
        assert_eq!(trade.commission, 1.0);
    }

    #[test]
    fn serialization_roundtrip() {
        let trade = Trade::new(date(), TradeSide::Sell, 3, 30.0, 1.0);
        let json = serde_json::to_string(&trade).unwrap();
        let deser: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deser);
    }
}
