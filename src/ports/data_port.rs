//! Price history port: per-ticker bars from the data layer.

use crate::domain::error::AtsimError;
use crate::domain::ohlcv::TimedBar;
use chrono::NaiveDate;

pub trait PanelSource {
    /// Bars of one ticker between `start` and `end` inclusive, sorted by
    /// time with one bar per timestamp. `None` bounds are open.
    fn fetch_bars(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<TimedBar>, AtsimError>;
}
