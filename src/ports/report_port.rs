//! Reporting sink port: consumes the finished equity series.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::AtsimError;
use std::path::Path;

pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        strategy_name: &str,
        output_path: &Path,
    ) -> Result<(), AtsimError>;
}
