//! Fixed-size sliding window over the most recent panel rows.

use crate::domain::panel::PriceRow;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct BarWindow {
    rows: VecDeque<PriceRow>,
    capacity: usize,
}

impl BarWindow {
    /// A window holding at most `lookback` past rows plus the current one.
    pub fn new(lookback: usize) -> Self {
        let capacity = lookback + 1;
        Self {
            rows: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, row: PriceRow) {
        if self.rows.len() == self.capacity {
            self.rows.pop_front();
        }
        self.rows.push_back(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row `bars_ago` bars before the latest; `ago(0)` is the latest row.
    pub fn ago(&self, bars_ago: usize) -> Option<&PriceRow> {
        let len = self.rows.len();
        if bars_ago >= len {
            return None;
        }
        self.rows.get(len - 1 - bars_ago)
    }

    pub fn latest(&self) -> Option<&PriceRow> {
        self.ago(0)
    }

    /// Closes of one ticker, oldest first.
    pub fn closes(&self, ticker: usize) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(move |row| row.close(ticker))
    }
}
