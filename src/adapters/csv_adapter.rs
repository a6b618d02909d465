//! CSV file data adapter: one `<TICKER>.csv` per ticker.
//!
//! Columns: `time,open,high,low,close`. `time` is `YYYY-MM-DD` or
//! `YYYY-MM-DD HH:MM:SS`. Rows may come in any order; duplicate timestamps
//! keep the last row.

use crate::domain::error::AtsimError;
use crate::domain::ohlcv::{OhlcBar, TimedBar};
use crate::ports::data_port::PanelSource;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

fn parse_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn price(record: &csv::StringRecord, index: usize, column: &str, line: u64) -> Result<f64, AtsimError> {
    let value: f64 = record
        .get(index)
        .ok_or_else(|| AtsimError::Data {
            reason: format!("line {}: missing {} column", line, column),
        })?
        .trim()
        .parse()
        .map_err(|e| AtsimError::Data {
            reason: format!("line {}: invalid {} value: {}", line, column, e),
        })?;
    if !value.is_finite() {
        return Err(AtsimError::Data {
            reason: format!("line {}: non-finite {} value", line, column),
        });
    }
    Ok(value)
}

impl PanelSource for CsvAdapter {
    fn fetch_bars(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<TimedBar>, AtsimError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AtsimError::NoData {
                ticker: ticker.to_string(),
            },
            _ => AtsimError::Data {
                reason: format!("failed to read {}: {}", path.display(), e),
            },
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| AtsimError::Data {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let time_str = record.get(0).ok_or_else(|| AtsimError::Data {
                reason: format!("line {}: missing time column", line),
            })?;
            let time = parse_time(time_str).ok_or_else(|| AtsimError::Data {
                reason: format!("line {}: invalid time '{}'", line, time_str),
            })?;

            let date = time.date();
            if start.is_some_and(|s| date < s) || end.is_some_and(|e| date > e) {
                continue;
            }

            bars.push(TimedBar {
                time,
                bar: OhlcBar {
                    open: price(&record, 1, "open", line)?,
                    high: price(&record, 2, "high", line)?,
                    low: price(&record, 3, "low", line)?,
                    close: price(&record, 4, "close", line)?,
                },
            });
        }

        bars.sort_by_key(|b| b.time);
        let mut deduped: Vec<TimedBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.time == bar.time => *last = bar,
                _ => deduped.push(bar),
            }
        }

        debug!(ticker, bars = deduped.len(), path = %path.display(), "loaded price history");
        Ok(deduped)
    }
}
