//! Derived signals computed from the rolling bar window.
//!
//! A [`Feature`] declares its name, how many past bars it needs, and whether
//! it is recursive (evaluated on every bar, warm-up included) or discrete
//! (evaluated only on decision bars). The strategy owns the features and
//! exposes their current values to the algo through a [`FeatureContext`].

pub mod ema;
pub mod roc;
pub mod volatility;

use crate::domain::error::AtsimError;
use crate::domain::window::BarWindow;
use chrono::NaiveDateTime;
use std::collections::{HashMap, HashSet};
use std::fmt;

pub use ema::ExponentialAverage;
pub use roc::RateOfChange;
pub use volatility::Volatility;

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    /// Cross-sectional value shared by the whole universe.
    Scalar(f64),
    /// One value per ticker, aligned with the universe.
    PerTicker(Vec<f64>),
}

pub trait Feature: fmt::Debug {
    fn name(&self) -> &str;

    /// Number of past bars needed, in addition to the current one.
    fn lookback(&self) -> usize;

    fn is_recursive(&self) -> bool;

    /// Recompute the value from `window`, whose latest row is the current bar.
    ///
    /// Discrete features are only called once the window holds `lookback + 1`
    /// rows. Recursive features are called from the first bar on and must
    /// cope with a shorter window.
    fn evaluate(&mut self, window: &BarWindow);

    /// The most recently computed value, if any.
    fn value(&self) -> Option<&FeatureValue>;
}

/// Current feature values for one decision bar, keyed by feature name.
#[derive(Debug)]
pub struct FeatureContext<'a> {
    time: NaiveDateTime,
    values: HashMap<&'a str, &'a FeatureValue>,
}

impl<'a> FeatureContext<'a> {
    pub fn new(time: NaiveDateTime) -> Self {
        Self {
            time,
            values: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: &'a str, value: &'a FeatureValue) {
        self.values.insert(name, value);
    }

    pub fn time(&self) -> NaiveDateTime {
        self.time
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.values.get(name).copied()
    }

    /// The per-ticker vector of `name`, checked against the universe width.
    pub fn per_ticker(&self, name: &str, width: usize) -> Result<&[f64], AtsimError> {
        match self.get(name) {
            Some(FeatureValue::PerTicker(values)) if values.len() == width => Ok(values),
            Some(FeatureValue::PerTicker(values)) => Err(AtsimError::DataShape {
                reason: format!(
                    "feature {} has {} values, universe has {} tickers",
                    name,
                    values.len(),
                    width
                ),
            }),
            Some(FeatureValue::Scalar(_)) => Err(AtsimError::DataShape {
                reason: format!("feature {} is scalar, expected one value per ticker", name),
            }),
            None => Err(AtsimError::DataShape {
                reason: format!("feature {} has no value at {}", name, self.time),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Roc,
    Ema,
    Stddev,
}

impl FeatureKind {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "roc" => Some(FeatureKind::Roc),
            "ema" => Some(FeatureKind::Ema),
            "stddev" | "vol" => Some(FeatureKind::Stddev),
            _ => None,
        }
    }

    fn default_name(&self) -> &'static str {
        match self {
            FeatureKind::Roc => "roc",
            FeatureKind::Ema => "ema",
            FeatureKind::Stddev => "stddev",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_name())
    }
}

/// A configured feature: `kind:period`, optionally `alias=kind:period`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSpec {
    pub name: String,
    pub kind: FeatureKind,
    pub period: usize,
}

impl FeatureSpec {
    pub fn build(&self) -> Box<dyn Feature> {
        match self.kind {
            FeatureKind::Roc => Box::new(RateOfChange::named(&self.name, self.period)),
            FeatureKind::Ema => Box::new(ExponentialAverage::named(&self.name, self.period)),
            FeatureKind::Stddev => Box::new(Volatility::named(&self.name, self.period)),
        }
    }
}

fn invalid_features(reason: String) -> AtsimError {
    AtsimError::ConfigInvalid {
        section: "strategy".to_string(),
        key: "features".to_string(),
        reason,
    }
}

/// Parse `roc:60, fast=ema:10` into feature specs with unique names.
pub fn parse_feature_list(input: &str) -> Result<Vec<FeatureSpec>, AtsimError> {
    let mut specs = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err(invalid_features("empty token in feature list".to_string()));
        }

        let (alias, body) = match token.split_once('=') {
            Some((alias, body)) => (Some(alias.trim()), body.trim()),
            None => (None, token),
        };
        let (kind_str, period_str) = body
            .split_once(':')
            .ok_or_else(|| invalid_features(format!("expected kind:period, got '{}'", body)))?;
        let kind = FeatureKind::parse(kind_str)
            .ok_or_else(|| invalid_features(format!("unknown feature kind '{}'", kind_str.trim())))?;
        let period: usize = period_str
            .trim()
            .parse()
            .map_err(|_| invalid_features(format!("invalid period '{}'", period_str.trim())))?;
        if period == 0 {
            return Err(invalid_features(format!("{} period must be positive", kind)));
        }

        let name = match alias {
            Some("") => return Err(invalid_features(format!("empty alias in '{}'", token))),
            Some(a) => a.to_string(),
            None => kind.default_name().to_string(),
        };
        if !seen.insert(name.clone()) {
            return Err(AtsimError::DuplicateFeature(name));
        }

        specs.push(FeatureSpec { name, kind, period });
    }

    Ok(specs)
}
