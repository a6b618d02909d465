//! Rate of change.
//!
//! ROC(n) = C[now] / C[now - n] - 1, per ticker.
//! If C[now - n] == 0: ROC = 0

use crate::domain::feature::{Feature, FeatureValue};
use crate::domain::window::BarWindow;

#[derive(Debug, Clone)]
pub struct RateOfChange {
    name: String,
    period: usize,
    value: Option<FeatureValue>,
}

impl RateOfChange {
    pub fn new(period: usize) -> Self {
        Self::named("roc", period)
    }

    pub fn named(name: &str, period: usize) -> Self {
        Self {
            name: name.to_string(),
            period,
            value: None,
        }
    }
}

impl Feature for RateOfChange {
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
        let (Some(now), Some(base)) = (window.latest(), window.ago(self.period)) else {
            return;
        };

        let values = now
            .bars
            .iter()
            .zip(&base.bars)
            .map(|(curr, prev)| {
                if prev.close == 0.0 {
                    0.0
                } else {
                    curr.close / prev.close - 1.0
                }
            })
            .collect();

        self.value = Some(FeatureValue::PerTicker(values));
    }

    fn value(&self) -> Option<&FeatureValue> {
        self.value.as_ref()
    }
}
