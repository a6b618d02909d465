//! OHLC bar representation.

use chrono::NaiveDateTime;

/// One ticker's prices for one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OhlcBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl OhlcBar {
    /// A bar whose four prices all equal `price`.
    pub fn flat(price: f64) -> Self {
        Self {
            open: price,
            high: price,
            low: price,
            close: price,
        }
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// A bar of a single ticker's history, as delivered by the data layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedBar {
    pub time: NaiveDateTime,
    pub bar: OhlcBar,
}
