//! Portfolio — the single-owner ledger.
//!
//! Tracks cash, the open position, the running equity peak, and the kill
//! switch, and records the two append-only logs (equity snapshots and
//! trades). All mutation happens through `mark_to_market` and
//! `rebalance_to_target`; nothing else touches this state.

use crate::domain::{EquitySnapshot, RiskLimits, Trade, TradeSide};
use crate::error::EngineError;
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct Portfolio {
    cash: f64,
    position_qty: u64,
    limits: RiskLimits,
    peak_equity: f64,
    kill_switch: bool,
    trades: Vec<Trade>,
    equity_curve: Vec<EquitySnapshot>,
}

impl Portfolio {
    pub fn new(initial_cash: f64, limits: RiskLimits) -> Result<Self, EngineError> {
        if !initial_cash.is_finite() || initial_cash <= 0.0 {
            return Err(EngineError::InvalidInitialCash(initial_cash));
        }
        Ok(Self {
            cash: initial_cash,
            position_qty: 0,
            limits,
            peak_equity: initial_cash,
            kill_switch: false,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        })
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position_qty(&self) -> u64 {
        self.position_qty
    }

    /// Once true, stays true for the rest of the run.
    pub fn kill_switch(&self) -> bool {
        self.kill_switch
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn equity_curve(&self) -> &[EquitySnapshot] {
        &self.equity_curve
    }

    /// Consumes the portfolio, handing out its append-only logs.
    pub fn into_logs(self) -> (Vec<EquitySnapshot>, Vec<Trade>) {
        (self.equity_curve, self.trades)
    }

    /// Marks the portfolio at a bar's close and runs the drawdown check.
    ///
    /// Called exactly once per bar, before any order for that bar
    /// executes. Places no trades; appends exactly one snapshot.
    pub fn mark_to_market(&mut self, date: NaiveDate, close: f64) {
        let equity = self.cash + self.position_qty as f64 * close;
        self.peak_equity = self.peak_equity.max(equity);

        let drawdown = if self.peak_equity == 0.0 {
            0.0
        } else {
            (self.peak_equity - equity) / self.peak_equity
        };

        if drawdown >= self.limits.max_drawdown() {
            self.kill_switch = true;
        }

        self.equity_curve.push(EquitySnapshot {
            date,
            cash: self.cash,
            position_qty: self.position_qty,
            close,
            equity,
            drawdown,
            kill_switch: self.kill_switch,
        });
    }

    /// The one sizing function: how many shares the portfolio wants to
    /// hold at `price` for a given target.
    ///
    /// Sizing uses an equity estimate at the quoted price (cash +
    /// position * price) and floors the share count:
    /// `floor(max_position_pct * equity / price)` for target 1, 0 for
    /// target 0. Both the simulation loop (to pick the trade side before
    /// slippage is applied) and `rebalance_to_target` call this, so the
    /// two can never disagree on rounding.
    pub fn desired_quantity(&self, target: i8, price: f64) -> Result<u64, EngineError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(EngineError::InvalidPrice(price));
        }
        match target {
            0 => Ok(0),
            1 => {
                let equity = self.cash + self.position_qty as f64 * price;
                let max_position_value = self.limits.max_position_pct() * equity;
                let qty = (max_position_value / price).floor();
                if qty.is_finite() && qty > 0.0 {
                    Ok(qty as u64)
                } else {
                    Ok(0)
                }
            }
            other => Err(EngineError::InvalidTarget(other)),
        }
    }

    /// Moves the position toward `target`, executing at `fill_price`.
    ///
    /// Sizing is done on `open_price` — the price known before the
    /// trade's own market impact — never on the fill price, so sizing and
    /// execution cannot become circularly dependent.
    ///
    /// Returns the executed trade, or `None` when nothing happened: kill
    /// switch already tripped, delta of zero, or a buy too small to
    /// afford even one share after commission. A buy that cannot be fully
    /// funded is clamped down to the largest affordable quantity, so cash
    /// never goes negative on a buy. Sells are never cash-constrained but
    /// still pay commission.
    pub fn rebalance_to_target(
        &mut self,
        date: NaiveDate,
        target: i8,
        open_price: f64,
        fill_price: f64,
        commission: f64,
    ) -> Result<Option<Trade>, EngineError> {
        if self.kill_switch {
            return Ok(None);
        }
        if !fill_price.is_finite() || fill_price <= 0.0 {
            return Err(EngineError::InvalidPrice(fill_price));
        }
        if !commission.is_finite() || commission < 0.0 {
            return Err(EngineError::InvalidCost {
                name: "commission",
                value: commission,
            });
        }

        let desired = self.desired_quantity(target, open_price)?;
        let delta = desired as i64 - self.position_qty as i64;
        if delta == 0 {
            return Ok(None);
        }

        let trade = if delta > 0 {
            let mut qty = delta as u64;
            let mut notional = qty as f64 * fill_price;
            if notional + commission > self.cash {
                // Clamp to the largest affordable quantity.
                let affordable = ((self.cash - commission) / fill_price).floor();
                if affordable <= 0.0 {
                    return Ok(None);
                }
                qty = affordable as u64;
                notional = qty as f64 * fill_price;
            }
            self.cash -= notional + commission;
            self.position_qty += qty;
            Trade::new(date, TradeSide::Buy, qty, fill_price, commission)
        } else {
            let qty = delta.unsigned_abs();
            let notional = qty as f64 * fill_price;
            self.cash += notional - commission;
            self.position_qty -= qty;
            Trade::new(date, TradeSide::Sell, qty, fill_price, commission)
        };

        self.trades.push(trade.clone());
        Ok(Some(trade))
    }
}
