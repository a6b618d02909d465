//! Equity series export as `time,equity` CSV.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::AtsimError;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;
use tracing::info;

pub struct CsvEquityAdapter;

fn csv_error(e: csv::Error) -> AtsimError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => AtsimError::Io(io),
        other => AtsimError::Data {
            reason: format!("CSV write error: {:?}", other),
        },
    }
}

impl ReportPort for CsvEquityAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        _strategy_name: &str,
        output_path: &Path,
    ) -> Result<(), AtsimError> {
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut wtr = csv::Writer::from_path(output_path).map_err(csv_error)?;
        wtr.write_record(["time", "equity"]).map_err(csv_error)?;
        for point in result.equity_curve() {
            wtr.write_record([point.time.to_string(), point.equity.to_string()])
                .map_err(csv_error)?;
        }
        wtr.flush()?;
        info!(path = %output_path.display(), points = result.equity_curve().len(), "equity csv written");
        Ok(())
    }
}
