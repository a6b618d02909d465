#![allow(dead_code)]

use atsim::domain::error::AtsimError;
use atsim::domain::ohlcv::{OhlcBar, TimedBar};
use atsim::domain::panel::{PricePanel, PriceRow};
use atsim::domain::strategy::DecisionSource;
use atsim::domain::universe::Universe;
use atsim::domain::weights::{Decision, Weights};
use atsim::ports::data_port::PanelSource;
use chrono::{NaiveDate, NaiveDateTime};
use std::cell::Cell;
use std::collections::HashMap;

pub struct MockPanelSource {
    pub data: HashMap<String, Vec<TimedBar>>,
    pub errors: HashMap<String, String>,
    pub fetches: Cell<usize>,
}

impl MockPanelSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            fetches: Cell::new(0),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<TimedBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl PanelSource for MockPanelSource {
    fn fetch_bars(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<TimedBar>, AtsimError> {
        self.fetches.set(self.fetches.get() + 1);
        if let Some(reason) = self.errors.get(ticker) {
            return Err(AtsimError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| start.is_none_or(|s| b.time.date() >= s))
                    .filter(|b| end.is_none_or(|e| b.time.date() <= e))
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Replays a fixed list of decisions, one per bar, then holds.
pub struct ScriptedSource(std::vec::IntoIter<Decision>);

impl ScriptedSource {
    pub fn new(decisions: Vec<Decision>) -> Self {
        Self(decisions.into_iter())
    }
}

impl DecisionSource for ScriptedSource {
    fn decide(&mut self, _row: &PriceRow) -> Result<Decision, AtsimError> {
        Ok(self.0.next().unwrap_or(Decision::NoChange))
    }
}

pub fn rebalance(weights: &[f64]) -> Decision {
    Decision::Rebalance(Weights::new(weights.to_vec()))
}

/// 2024-01-01 (a Monday) plus `i` days.
pub fn day(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::days(i as i64)
}

pub fn universe(tickers: &[&str]) -> Universe {
    Universe::new(tickers.iter().map(|t| t.to_string()).collect()).unwrap()
}

pub fn row(i: usize, closes: &[f64]) -> PriceRow {
    PriceRow {
        time: day(i),
        bars: closes.iter().map(|&c| OhlcBar::flat(c)).collect(),
    }
}

pub fn make_panel(tickers: &[&str], closes: &[Vec<f64>]) -> PricePanel {
    let rows = closes.iter().enumerate().map(|(i, c)| row(i, c)).collect();
    PricePanel::new(universe(tickers), rows).unwrap()
}

/// One ticker's series starting at `day(0)`, one bar per day.
pub fn series(closes: &[f64]) -> Vec<TimedBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| TimedBar {
            time: day(i),
            bar: OhlcBar {
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
            },
        })
        .collect()
}

/// Closes rising at different relative speeds: B slowest, C fastest.
pub fn trending_closes(bars: usize) -> Vec<Vec<f64>> {
    (0..bars)
        .map(|i| {
            let x = i as f64;
            vec![100.0 + x, 50.0 + 0.2 * x, 20.0 + 2.0 * x]
        })
        .collect()
}

pub fn constant_closes(bars: usize) -> Vec<Vec<f64>> {
    (0..bars).map(|_| vec![10.0, 10.0, 10.0]).collect()
}
