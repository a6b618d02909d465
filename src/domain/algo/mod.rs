//! Decision rules mapping feature values to target weights.

pub mod long_short;

use crate::domain::error::AtsimError;
use crate::domain::feature::FeatureContext;
use crate::domain::universe::Universe;
use crate::domain::weights::Decision;
use std::fmt;

pub use long_short::LongShort;

pub trait Algo: fmt::Debug {
    fn name(&self) -> &str;

    /// Names of the features this algo reads.
    fn dependencies(&self) -> Vec<String>;

    /// Validate dependencies against the configured features, then run
    /// [`Algo::prepare`]. Called once, before the first bar.
    fn setup(&mut self, universe: &Universe, available: &[&str]) -> Result<(), AtsimError> {
        check_dependencies(self.name(), &self.dependencies(), available)?;
        self.prepare(universe)
    }

    /// Precompute anything that depends only on the universe.
    fn prepare(&mut self, universe: &Universe) -> Result<(), AtsimError>;

    /// Normalized target weights for the current bar, or no change.
    fn decide(&self, features: &FeatureContext<'_>) -> Result<Decision, AtsimError>;
}

pub fn check_dependencies(
    algo: &str,
    dependencies: &[String],
    available: &[&str],
) -> Result<(), AtsimError> {
    let mut missing: Vec<String> = Vec::new();
    for dep in dependencies {
        if !available.contains(&dep.as_str()) && !missing.contains(dep) {
            missing.push(dep.clone());
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AtsimError::MissingFeatures {
            algo: algo.to_string(),
            missing,
        })
    }
}

/// Algo choice as read from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgoSpec {
    LongShort {
        factor: String,
        n_long: usize,
        n_short: usize,
    },
}

impl AlgoSpec {
    pub fn build(&self) -> Box<dyn Algo> {
        match self {
            AlgoSpec::LongShort {
                factor,
                n_long,
                n_short,
            } => Box::new(LongShort::new(factor, *n_long, *n_short)),
        }
    }
}
