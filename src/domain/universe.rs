//! Ticker universe: the ordered, immutable symbol list of a run.
//!
//! Every per-ticker vector in the engine (closes, shares, weights, feature
//! values) is indexed positionally against this sequence.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Universe {
    tickers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),

    #[error("ticker universe is empty")]
    Empty,
}

impl Universe {
    pub fn new(tickers: Vec<String>) -> Result<Self, UniverseError> {
        if tickers.is_empty() {
            return Err(UniverseError::Empty);
        }
        let mut seen = HashSet::new();
        for ticker in &tickers {
            if ticker.trim().is_empty() {
                return Err(UniverseError::EmptyToken);
            }
            if !seen.insert(ticker.as_str()) {
                return Err(UniverseError::DuplicateTicker(ticker.clone()));
            }
        }
        Ok(Self { tickers })
    }

    /// Parse a comma separated list, uppercasing each symbol.
    pub fn parse(input: &str) -> Result<Self, UniverseError> {
        Self::new(parse_tickers(input)?)
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}
