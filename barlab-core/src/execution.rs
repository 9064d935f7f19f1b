//! Execution model — fill pricing with directional slippage and a fixed
//! per-trade commission.
//!
//! Slippage models market impact and bid-ask crossing as a basis-point
//! adjustment in the trade's direction: buys pay a premium, sells receive
//! a discount. The model is a pure value; identical inputs always produce
//! identical fills, which is what makes runs replayable bit-for-bit.

use crate::domain::TradeSide;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExecutionModel {
    slippage_bps: f64,
    commission: f64,
}

impl ExecutionModel {
    pub fn new(slippage_bps: f64, commission: f64) -> Result<Self, EngineError> {
        if !slippage_bps.is_finite() || slippage_bps < 0.0 {
            return Err(EngineError::InvalidCost {
                name: "slippage_bps",
                value: slippage_bps,
            });
        }
        if !commission.is_finite() || commission < 0.0 {
            return Err(EngineError::InvalidCost {
                name: "commission",
                value: commission,
            });
        }
        Ok(Self {
            slippage_bps,
            commission,
        })
    }

    pub fn slippage_bps(&self) -> f64 {
        self.slippage_bps
    }

    pub fn commission(&self) -> f64 {
        self.commission
    }

    /// Adjusts a reference price in the trade's direction.
    ///
    /// `fill_price = price * (1 + (slippage_bps / 10_000) * direction)`.
    pub fn apply_slippage(&self, price: f64, side: TradeSide) -> Result<f64, EngineError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(EngineError::InvalidPrice(price));
        }
        let slip = self.slippage_bps / 10_000.0;
        Ok(price * (1.0 + slip * side.direction()))
    }

    /// Prices a fill of `qty` shares against `reference_price`.
    ///
    /// Returns `(fill_price, cost)` where cost is the fixed commission
    /// (independent of notional and quantity in this model).
    pub fn fill(
        &self,
        reference_price: f64,
        side: TradeSide,
        qty: u64,
    ) -> Result<(f64, f64), EngineError> {
        if qty == 0 {
            return Err(EngineError::InvalidQuantity);
        }
        let fill_price = self.apply_slippage(reference_price, side)?;
        Ok((fill_price, self.commission))
    }
}

impl Default for ExecutionModel {
    /// 2 bps slippage, 1.0 commission per trade.
    fn default() -> Self {
        Self {
            slippage_bps: 2.0,
            commission: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_pays_premium_exactly() {
        let model = ExecutionModel::new(200.0, 0.0).unwrap();
        let (fill, cost) = model.fill(100.0, TradeSide::Buy, 10).unwrap();
        assert_eq!(fill, 102.0);
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn sell_receives_discount_exactly() {
        let model = ExecutionModel::new(200.0, 0.0).unwrap();
        let (fill, _) = model.fill(100.0, TradeSide::Sell, 10).unwrap();
        assert_eq!(fill, 98.0);
    }

    #[test]
    fn zero_slippage_fills_at_reference() {
        let model = ExecutionModel::new(0.0, 1.0).unwrap();
        let (fill, cost) = model.fill(50.0, TradeSide::Buy, 500).unwrap();
        assert_eq!(fill, 50.0);
        assert_eq!(cost, 1.0);
    }

    #[test]
    fn commission_is_flat_per_trade() {
        let model = ExecutionModel::new(2.0, 1.5).unwrap();
        let (_, small) = model.fill(100.0, TradeSide::Buy, 1).unwrap();
        let (_, large) = model.fill(100.0, TradeSide::Buy, 1_000_000).unwrap();
        assert_eq!(small, 1.5);
        assert_eq!(large, 1.5);
    }

    #[test]
    fn rejects_non_positive_price() {
        let model = ExecutionModel::default();
        assert_eq!(
            model.fill(0.0, TradeSide::Buy, 1).unwrap_err(),
            EngineError::InvalidPrice(0.0)
        );
        assert!(model.fill(-5.0, TradeSide::Sell, 1).is_err());
        assert!(model.fill(f64::NAN, TradeSide::Buy, 1).is_err());
    }

    #[test]
    fn rejects_zero_quantity() {
        let model = ExecutionModel::default();
        assert_eq!(
            model.fill(100.0, TradeSide::Buy, 0).unwrap_err(),
            EngineError::InvalidQuantity
        );
    }

    #[test]
    fn rejects_negative_parameters() {
        assert!(ExecutionModel::new(-1.0, 0.0).is_err());
        assert!(ExecutionModel::new(0.0, -1.0).is_err());
        assert!(ExecutionModel::new(f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn referentially_transparent() {
        let model = ExecutionModel::new(37.0, 0.65).unwrap();
        let a = model.fill(123.45, TradeSide::Sell, 77).unwrap();
        let b = model.fill(123.45, TradeSide::Sell, 77).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn default_matches_documented_values() {
        let model = ExecutionModel::default();
        assert_eq!(model.slippage_bps(), 2.0);
        assert_eq!(model.commission(), 1.0);
    }
}
