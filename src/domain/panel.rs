//! Price panel: time-ordered rows of per-ticker OHLC bars.
//!
//! Rows are aligned positionally with the [`Universe`]. A panel never
//! contains a gap: assembling one from per-ticker histories fails instead of
//! filling missing values.

use crate::domain::error::AtsimError;
use crate::domain::ohlcv::{OhlcBar, TimedBar};
use crate::domain::universe::Universe;
use chrono::NaiveDateTime;
use std::collections::{BTreeSet, HashMap};

const MISSING_PREVIEW: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub time: NaiveDateTime,
    pub bars: Vec<OhlcBar>,
}

impl PriceRow {
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn close(&self, ticker: usize) -> f64 {
        self.bars[ticker].close
    }
}

#[derive(Debug, Clone)]
pub struct PricePanel {
    universe: Universe,
    rows: Vec<PriceRow>,
}

impl PricePanel {
    /// Build a panel from prepared rows, checking ordering, row width and
    /// that every price is finite.
    pub fn new(universe: Universe, rows: Vec<PriceRow>) -> Result<Self, AtsimError> {
        for (i, row) in rows.iter().enumerate() {
            if row.bars.len() != universe.len() {
                return Err(AtsimError::DataShape {
                    reason: format!(
                        "row {} at {} has {} bars, universe has {} tickers",
                        i,
                        row.time,
                        row.bars.len(),
                        universe.len()
                    ),
                });
            }
            let bad = row.bars.iter().position(|b| {
                ![b.open, b.high, b.low, b.close]
                    .iter()
                    .all(|v| v.is_finite())
            });
            if let Some(ticker) = bad {
                return Err(AtsimError::Data {
                    reason: format!(
                        "row {} at {}: non-finite price for {}",
                        i,
                        row.time,
                        universe.tickers()[ticker]
                    ),
                });
            }
        }
        for pair in rows.windows(2) {
            if pair[1].time <= pair[0].time {
                return Err(AtsimError::DataShape {
                    reason: format!(
                        "timestamps not strictly increasing: {} then {}",
                        pair[0].time, pair[1].time
                    ),
                });
            }
        }
        Ok(Self { universe, rows })
    }

    /// Join per-ticker histories on timestamp. `series[i]` belongs to the
    /// i-th ticker of `universe`.
    pub fn assemble(universe: Universe, series: Vec<Vec<TimedBar>>) -> Result<Self, AtsimError> {
        if series.len() != universe.len() {
            return Err(AtsimError::DataShape {
                reason: format!(
                    "{} price series supplied for {} tickers",
                    series.len(),
                    universe.len()
                ),
            });
        }

        let timeline: BTreeSet<NaiveDateTime> = series
            .iter()
            .flat_map(|s| s.iter().map(|b| b.time))
            .collect();

        let lookups: Vec<HashMap<NaiveDateTime, OhlcBar>> = series
            .iter()
            .map(|s| s.iter().map(|b| (b.time, b.bar)).collect())
            .collect();

        for (ticker, lookup) in universe.tickers().iter().zip(&lookups) {
            let missing: Vec<String> = timeline
                .iter()
                .filter(|t| !lookup.contains_key(t))
                .map(|t| t.to_string())
                .collect();
            if !missing.is_empty() {
                let preview = missing
                    .iter()
                    .take(MISSING_PREVIEW)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(AtsimError::DataShape {
                    reason: format!(
                        "{} is missing {} of {} rows (first: {})",
                        ticker,
                        missing.len(),
                        timeline.len(),
                        preview
                    ),
                });
            }
        }

        let rows = timeline
            .into_iter()
            .map(|time| PriceRow {
                time,
                bars: lookups.iter().map(|lookup| lookup[&time]).collect(),
            })
            .collect();

        Self::new(universe, rows)
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn series(days: &[u32], base: f64) -> Vec<TimedBar> {
        days.iter()
            .map(|&d| TimedBar {
                time: day(d),
                bar: OhlcBar::flat(base + d as f64),
            })
            .collect()
    }

    fn universe(tickers: &[&str]) -> Universe {
        Universe::new(tickers.iter().map(|t| t.to_string()).collect()).unwrap()
    }

    #[test]
    fn assemble_aligns_by_time() {
        let panel = PricePanel::assemble(
            universe(&["A", "B"]),
            vec![series(&[3, 1, 2], 10.0), series(&[1, 2, 3], 20.0)],
        )
        .unwrap();

        assert_eq!(panel.len(), 3);
        assert_eq!(panel.rows()[0].time, day(1));
        assert_eq!(panel.rows()[0].closes(), vec![11.0, 21.0]);
        assert_eq!(panel.rows()[2].closes(), vec![13.0, 23.0]);
    }

    #[test]
    fn assemble_rejects_gaps() {
        let err = PricePanel::assemble(
            universe(&["A", "B"]),
            vec![series(&[1, 2, 3], 10.0), series(&[1, 3], 20.0)],
        )
        .unwrap_err();

        match err {
            AtsimError::DataShape { reason } => {
                assert!(reason.starts_with("B is missing 1 of 3 rows"));
                assert!(reason.contains("2024-01-02"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn assemble_rejects_series_count_mismatch() {
        let err = PricePanel::assemble(universe(&["A", "B"]), vec![series(&[1], 1.0)]);
        assert!(matches!(err, Err(AtsimError::DataShape { .. })));
    }

    #[test]
    fn new_rejects_wrong_row_width() {
        let rows = vec![PriceRow {
            time: day(1),
            bars: vec![OhlcBar::flat(1.0)],
        }];
        let err = PricePanel::new(universe(&["A", "B"]), rows);
        assert!(matches!(err, Err(AtsimError::DataShape { .. })));
    }

    #[test]
    fn new_rejects_unordered_rows() {
        let rows = vec![
            PriceRow {
                time: day(2),
                bars: vec![OhlcBar::flat(1.0)],
            },
            PriceRow {
                time: day(2),
                bars: vec![OhlcBar::flat(1.0)],
            },
        ];
        let err = PricePanel::new(universe(&["A"]), rows);
        assert!(matches!(err, Err(AtsimError::DataShape { .. })));
    }

    #[test]
    fn new_rejects_non_finite_close() {
        let rows = vec![PriceRow {
            time: day(1),
            bars: vec![OhlcBar::flat(10.0), OhlcBar::flat(f64::NAN)],
        }];
        match PricePanel::new(universe(&["A", "B"]), rows).unwrap_err() {
            AtsimError::Data { reason } => {
                assert!(reason.contains("non-finite price for B"));
                assert!(reason.contains("2024-01-01"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn assemble_rejects_infinite_close() {
        let mut b = series(&[1, 2], 20.0);
        b[1].bar.close = f64::INFINITY;
        let err = PricePanel::assemble(universe(&["A", "B"]), vec![series(&[1, 2], 10.0), b]);
        assert!(matches!(err, Err(AtsimError::Data { .. })));
    }

    #[test]
    fn empty_panel_is_valid() {
        let panel = PricePanel::new(universe(&["A"]), vec![]).unwrap();
        assert!(panel.is_empty());
    }
}
