//! Strategy orchestration: rolling window, feature evaluation order,
//! warm-up and schedule gating, and the algo call.
//!
//! A strategy is built against a fixed universe; all configuration errors
//! (duplicate features, missing algo dependencies, oversized long/short
//! legs) surface from [`Strategy::new`], before any bar is seen.

use crate::domain::algo::Algo;
use crate::domain::error::AtsimError;
use crate::domain::feature::{Feature, FeatureContext};
use crate::domain::panel::PriceRow;
use crate::domain::schedule::{Always, Schedule};
use crate::domain::universe::Universe;
use crate::domain::weights::Decision;
use crate::domain::window::BarWindow;
use std::collections::HashSet;
use tracing::{debug, info};

/// Where a bar falls relative to the required lookback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Bar index <= required lookback: buffers fill, no decision.
    WarmUp,
    /// Bar index > required lookback: decisions on eligible bars.
    Active,
}

impl Phase {
    pub fn of(bar_index: usize, lookback: usize) -> Self {
        if bar_index > lookback {
            Phase::Active
        } else {
            Phase::WarmUp
        }
    }
}

/// Anything that turns one bar into a rebalance decision.
pub trait DecisionSource {
    fn decide(&mut self, row: &PriceRow) -> Result<Decision, AtsimError>;
}

#[derive(Debug)]
pub struct Strategy {
    name: String,
    features: Vec<Box<dyn Feature>>,
    recursive: Vec<usize>,
    discrete: Vec<usize>,
    algo: Box<dyn Algo>,
    schedule: Box<dyn Schedule>,
    lookback: usize,
    width: usize,
    bar_index: usize,
    window: BarWindow,
}

impl Strategy {
    pub fn new(
        name: &str,
        features: Vec<Box<dyn Feature>>,
        mut algo: Box<dyn Algo>,
        schedule: Option<Box<dyn Schedule>>,
        universe: &Universe,
    ) -> Result<Self, AtsimError> {
        let mut seen = HashSet::new();
        for feature in &features {
            if !seen.insert(feature.name()) {
                return Err(AtsimError::DuplicateFeature(feature.name().to_string()));
            }
        }

        let names: Vec<&str> = features.iter().map(|f| f.name()).collect();
        algo.setup(universe, &names)?;

        let lookback = features.iter().map(|f| f.lookback()).max().unwrap_or(0);
        let (recursive, discrete): (Vec<usize>, Vec<usize>) =
            (0..features.len()).partition(|&i| features[i].is_recursive());

        info!(
            strategy = name,
            lookback,
            recursive = recursive.len(),
            discrete = discrete.len(),
            algo = algo.name(),
            "strategy ready"
        );

        Ok(Self {
            name: name.to_string(),
            features,
            recursive,
            discrete,
            algo,
            schedule: schedule.unwrap_or_else(|| Box::new(Always)),
            lookback,
            width: universe.len(),
            bar_index: 0,
            window: BarWindow::new(lookback),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum lookback across all features.
    pub fn required_lookback(&self) -> usize {
        self.lookback
    }

    /// Phase the next bar will be processed in.
    pub fn phase(&self) -> Phase {
        Phase::of(self.bar_index, self.lookback)
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name()).collect()
    }

    /// Consume one bar and return its decision.
    pub fn on_bar(&mut self, row: &PriceRow) -> Result<Decision, AtsimError> {
        if row.bars.len() != self.width {
            return Err(AtsimError::DataShape {
                reason: format!(
                    "bar at {} has {} tickers, strategy {} expects {}",
                    row.time,
                    row.bars.len(),
                    self.name,
                    self.width
                ),
            });
        }

        self.window.push(row.clone());

        for &i in &self.recursive {
            self.features[i].evaluate(&self.window);
        }

        let phase = self.phase();
        if phase == Phase::Active && self.bar_index == self.lookback + 1 {
            debug!(strategy = %self.name, bar = self.bar_index, time = %row.time, "warm-up complete");
        }

        let decision = if phase == Phase::Active && self.schedule.is_eligible(row.time) {
            for &i in &self.discrete {
                self.features[i].evaluate(&self.window);
            }
            let mut ctx = FeatureContext::new(row.time);
            for feature in &self.features {
                if let Some(value) = feature.value() {
                    ctx.insert(feature.name(), value);
                }
            }
            self.algo.decide(&ctx)?
        } else {
            Decision::NoChange
        };

        self.bar_index += 1;
        Ok(decision)
    }
}

impl DecisionSource for Strategy {
    fn decide(&mut self, row: &PriceRow) -> Result<Decision, AtsimError> {
        self.on_bar(row)
    }
}
