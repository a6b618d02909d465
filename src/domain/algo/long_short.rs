//! Long/short ranking on a single per-ticker factor.
//!
//! Tickers are ranked ascending by factor value. The `n_short` lowest are
//! shorted, the `n_long` highest are bought, equal weight each side before
//! normalization. Equal factor values keep universe order (stable sort), so
//! the earlier ticker gets the lower rank.

use crate::domain::algo::Algo;
use crate::domain::error::AtsimError;
use crate::domain::feature::FeatureContext;
use crate::domain::universe::Universe;
use crate::domain::weights::{Decision, Weights};

#[derive(Debug, Clone)]
pub struct LongShort {
    factor: String,
    n_long: usize,
    n_short: usize,
    width: usize,
}

impl LongShort {
    pub fn new(factor: &str, n_long: usize, n_short: usize) -> Self {
        Self {
            factor: factor.to_string(),
            n_long,
            n_short,
            width: 0,
        }
    }

    /// Rank of each ticker, 0 for the lowest factor value.
    fn ranks(values: &[f64]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        let mut ranks = vec![0; values.len()];
        for (rank, &ticker) in order.iter().enumerate() {
            ranks[ticker] = rank;
        }
        ranks
    }
}

impl Algo for LongShort {
    fn name(&self) -> &str {
        "longshort"
    }

    fn dependencies(&self) -> Vec<String> {
        vec![self.factor.clone()]
    }

    fn prepare(&mut self, universe: &Universe) -> Result<(), AtsimError> {
        let requested = self.n_long.checked_add(self.n_short);
        if requested.is_none_or(|n| n > universe.len()) {
            return Err(AtsimError::InsufficientUniverse {
                algo: self.name().to_string(),
                requested: self.n_long.saturating_add(self.n_short),
                available: universe.len(),
            });
        }
        self.width = universe.len();
        Ok(())
    }

    fn decide(&self, features: &FeatureContext<'_>) -> Result<Decision, AtsimError> {
        let values = features.per_ticker(&self.factor, self.width)?;
        let long_from = self.width.saturating_sub(self.n_long);

        let weights: Vec<f64> = Self::ranks(values)
            .into_iter()
            .map(|rank| {
                if rank >= long_from {
                    1.0
                } else if rank < self.n_short {
                    -1.0
                } else {
                    0.0
                }
            })
            .collect();

        let weights = Weights::new(weights);
        if weights.gross() == 0.0 {
            return Ok(Decision::NoChange);
        }
        Ok(Decision::Rebalance(weights.normalized()))
    }
}
