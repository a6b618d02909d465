//! Backtest engine and event loop.
//!
//! One synchronous pass over the panel. Per bar, in order:
//! 1. value the portfolio at the bar's closes;
//! 2. apply the weights decided on the previous bar, if any, at this bar's
//!    closes, charging commission on the share delta;
//! 3. record the equity point;
//! 4. ask the decision source for this bar's decision and hold it for the
//!    next bar.
//!
//! A decision made on bar t is therefore filled at bar t + 1's close.

use crate::domain::error::AtsimError;
use crate::domain::panel::PricePanel;
use crate::domain::portfolio::{EquityPoint, Portfolio, Rebalance};
use crate::domain::strategy::DecisionSource;
use crate::domain::weights::{Decision, Weights};
use tracing::{debug, info};

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub commission_per_share: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            commission_per_share: 0.0,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), AtsimError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(AtsimError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "initial_capital".to_string(),
                reason: "initial_capital must be positive".to_string(),
            });
        }
        if !(self.commission_per_share.is_finite() && self.commission_per_share >= 0.0) {
            return Err(AtsimError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "broker".to_string(),
                reason: "commission per share must be non-negative".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub portfolio: Portfolio,
    pub rebalances: Vec<Rebalance>,
}

impl BacktestResult {
    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.portfolio.equity_curve
    }

    pub fn final_equity(&self) -> f64 {
        self.portfolio
            .equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.portfolio.initial_capital)
    }

    pub fn total_commission(&self) -> f64 {
        self.rebalances.iter().map(|r| r.commission).sum()
    }
}

pub fn run_backtest(
    panel: &PricePanel,
    source: &mut dyn DecisionSource,
    config: &BacktestConfig,
) -> Result<BacktestResult, AtsimError> {
    config.validate()?;

    let mut portfolio = Portfolio::new(config.initial_capital, panel.universe().len());
    let mut rebalances = Vec::new();
    let mut pending: Option<Weights> = None;

    for row in panel.rows() {
        let closes = row.closes();
        let mut value = portfolio.value(&closes);

        if let Some(weights) = pending.take() {
            let rebalance = portfolio.rebalance(
                row.time,
                value,
                &weights,
                &closes,
                config.commission_per_share,
            )?;
            debug!(
                time = %row.time,
                turnover = rebalance.turnover,
                commission = rebalance.commission,
                "rebalanced"
            );
            value = rebalance.value_after;
            rebalances.push(rebalance);
        }

        portfolio.record_equity(row.time, value);

        pending = match source.decide(row)? {
            Decision::NoChange => None,
            Decision::Rebalance(weights) => Some(weights.normalized()),
        };
    }

    let result = BacktestResult {
        portfolio,
        rebalances,
    };
    info!(
        bars = panel.len(),
        rebalances = result.rebalances.len(),
        final_equity = result.final_equity(),
        commission = result.total_commission(),
        "backtest complete"
    );
    Ok(result)
}
