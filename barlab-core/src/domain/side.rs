//! Trade side.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way a trade goes. Buys pay the slippage premium, sells receive
/// the discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// Slippage direction: +1 for buys, -1 for sells.
    pub fn direction(&self) -> f64 {
        match self {
            TradeSide::Buy => 1.0,
            TradeSide::Sell => -1.0,
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_signs() {
        assert_eq!(TradeSide::Buy.direction(), 1.0);
        assert_eq!(TradeSide::Sell.direction(), -1.0);
    }

    #[test]
    fn display_uppercase() {
        assert_eq!(TradeSide::Buy.to_string(), "BUY");
        assert_eq!(TradeSide::Sell.to_string(), "SELL");
    }
}
