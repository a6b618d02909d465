//! Portfolio state, rebalancing arithmetic and equity tracking.
//!
//! Shares are whole units. Short positions are 100% margin backed: opening
//! any position, long or short, ties up cash equal to its absolute notional.

use crate::domain::error::AtsimError;
use crate::domain::weights::Weights;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub time: NaiveDateTime,
    pub equity: f64,
}

/// One executed rebalance.
#[derive(Debug, Clone, PartialEq)]
pub struct Rebalance {
    pub time: NaiveDateTime,
    /// Sum of absolute share deltas.
    pub turnover: u64,
    pub commission: f64,
    /// Portfolio value after commission.
    pub value_after: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub shares: Vec<i64>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_capital: f64, width: usize) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            shares: vec![0; width],
            equity_curve: Vec::new(),
        }
    }

    /// cash + sum(shares * closes)
    pub fn value(&self, closes: &[f64]) -> f64 {
        let holdings: f64 = self
            .shares
            .iter()
            .zip(closes)
            .map(|(&s, &c)| s as f64 * c)
            .sum();
        self.cash + holdings
    }

    pub fn record_equity(&mut self, time: NaiveDateTime, equity: f64) {
        self.equity_curve.push(EquityPoint { time, equity });
    }

    /// Move to `weights` of `portfolio_value` at `closes`, charging
    /// `commission_per_share` on every share bought or sold. Commission is
    /// taken from cash and from the returned portfolio value alike.
    pub fn rebalance(
        &mut self,
        time: NaiveDateTime,
        portfolio_value: f64,
        weights: &Weights,
        closes: &[f64],
        commission_per_share: f64,
    ) -> Result<Rebalance, AtsimError> {
        if weights.len() != self.shares.len() || closes.len() != self.shares.len() {
            return Err(AtsimError::DataShape {
                reason: format!(
                    "rebalance at {} with {} weights and {} closes for {} positions",
                    time,
                    weights.len(),
                    closes.len(),
                    self.shares.len()
                ),
            });
        }

        let mut target = Vec::with_capacity(self.shares.len());
        for (i, (&w, &close)) in weights.as_slice().iter().zip(closes).enumerate() {
            if w == 0.0 {
                target.push(0);
                continue;
            }
            if !(close.is_finite() && close > 0.0) {
                return Err(AtsimError::Data {
                    reason: format!("cannot size position {} at {}: close is {}", i, time, close),
                });
            }
            target.push((portfolio_value * w / close).trunc() as i64);
        }

        let notional: f64 = target
            .iter()
            .zip(closes)
            .map(|(&s, &c)| s.unsigned_abs() as f64 * c)
            .sum();
        let turnover: u64 = target
            .iter()
            .zip(&self.shares)
            .map(|(&new, &old)| new.abs_diff(old))
            .sum();
        let commission = turnover as f64 * commission_per_share;

        self.cash = portfolio_value - notional - commission;
        self.shares = target;

        Ok(Rebalance {
            time,
            turnover,
            commission,
            value_after: portfolio_value - commission,
        })
    }
}
