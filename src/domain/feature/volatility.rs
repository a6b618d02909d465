//! Rolling volatility: population standard deviation of the last n
//! one-bar returns, per ticker. A zero previous close contributes a zero
//! return.

use crate::domain::feature::{Feature, FeatureValue};
use crate::domain::window::BarWindow;

#[derive(Debug, Clone)]
pub struct Volatility {
    name: String,
    period: usize,
    value: Option<FeatureValue>,
}

impl Volatility {
    pub fn new(period: usize) -> Self {
        Self::named("stddev", period)
    }

    pub fn named(name: &str, period: usize) -> Self {
        Self {
            name: name.to_string(),
            period,
            value: None,
        }
    }
}

fn population_stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

impl Feature for Volatility {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn is_recursive(&self) -> bool {
        false
    }

    fn evaluate(&mut self, window: &BarWindow) {
        let Some(now) = window.latest() else {
            return;
        };
        if window.len() < self.period + 1 {
            return;
        }
        let skip = window.len() - (self.period + 1);

        let values = (0..now.bars.len())
            .map(|ticker| {
                let closes: Vec<f64> = window.closes(ticker).skip(skip).collect();
                let returns: Vec<f64> = closes
                    .windows(2)
                    .map(|w| if w[0] == 0.0 { 0.0 } else { w[1] / w[0] - 1.0 })
                    .collect();
                population_stddev(&returns)
            })
            .collect();

        self.value = Some(FeatureValue::PerTicker(values));
    }

    fn value(&self) -> Option<&FeatureValue> {
        self.value.as_ref()
    }
}
