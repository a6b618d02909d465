//! Exponential moving average of closes, maintained incrementally.
//!
//! k = 2/(n+1), seeded with the first close seen, then
//! EMA = C*k + EMA_prev*(1-k). Recursive: must see every bar.

use crate::domain::feature::{Feature, FeatureValue};
use crate::domain::window::BarWindow;

#[derive(Debug, Clone)]
pub struct ExponentialAverage {
    name: String,
    period: usize,
    value: Option<FeatureValue>,
}

impl ExponentialAverage {
    pub fn new(period: usize) -> Self {
        Self::named("ema", period)
    }

    pub fn named(name: &str, period: usize) -> Self {
        Self {
            name: name.to_string(),
            period,
            value: None,
        }
    }

    fn smoothing(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }
}

impl Feature for ExponentialAverage {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn is_recursive(&self) -> bool {
        true
    }

    fn evaluate(&mut self, window: &BarWindow) {
        let Some(now) = window.latest() else {
            return;
        };
        let k = self.smoothing();

        let next = match self.value.take() {
            Some(FeatureValue::PerTicker(prev)) if prev.len() == now.bars.len() => now
                .bars
                .iter()
                .zip(prev)
                .map(|(bar, ema)| bar.close * k + ema * (1.0 - k))
                .collect(),
            _ => now.closes(),
        };

        self.value = Some(FeatureValue::PerTicker(next));
    }

    fn value(&self) -> Option<&FeatureValue> {
        self.value.as_ref()
    }
}
