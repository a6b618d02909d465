//! HTML report adapter implementing ReportPort.
//!
//! A single self-contained page: summary table, inline SVG equity and
//! drawdown charts, and the rebalance log.

use std::fs;
use std::path::Path;

use askama::Template;

use crate::adapters::chart_svg;
use crate::domain::backtest::BacktestResult;
use crate::domain::error::AtsimError;
use crate::domain::metrics::Summary;
use crate::domain::portfolio::Rebalance;
use crate::ports::report_port::ReportPort;
use tracing::info;

pub struct HtmlReportAdapter;

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

struct SummaryRow {
    label: &'static str,
    value: String,
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    strategy_name: &'a str,
    summary_rows: Vec<SummaryRow>,
    equity_svg: String,
    drawdown_svg: String,
    rebalances: &'a [Rebalance],
}

fn pct(x: f64) -> String {
    format!("{:.2}%", x * 100.0)
}

fn summary_rows(summary: &Summary, result: &BacktestResult) -> Vec<SummaryRow> {
    [
        ("Bars", summary.bars.to_string()),
        ("Starting equity", format!("{:.2}", summary.start_equity)),
        ("Final equity", format!("{:.2}", summary.final_equity)),
        ("Total return", pct(summary.total_return)),
        ("CAGR", pct(summary.cagr)),
        ("Sharpe ratio", format!("{:.2}", summary.sharpe_ratio)),
        ("Max drawdown", pct(summary.max_drawdown)),
        ("Max drawdown duration (bars)", summary.max_drawdown_duration.to_string()),
        ("Rebalances", result.rebalances.len().to_string()),
        ("Total commission", format!("{:.2}", result.total_commission())),
        ("Final cash", format!("{:.2}", result.portfolio.cash)),
    ]
    .into_iter()
    .map(|(label, value)| SummaryRow { label, value })
    .collect()
}

/// Render the report page. The strategy name is escaped by the template.
pub fn render(result: &BacktestResult, strategy_name: &str) -> Result<String, AtsimError> {
    let summary = Summary::compute(result.equity_curve());
    let template = ReportTemplate {
        strategy_name,
        summary_rows: summary_rows(&summary, result),
        equity_svg: chart_svg::equity_svg(result.equity_curve()),
        drawdown_svg: chart_svg::drawdown_svg(result.equity_curve()),
        rebalances: &result.rebalances,
    };
    template
        .render()
        .map_err(|e| AtsimError::Io(std::io::Error::other(e.to_string())))
}

impl ReportPort for HtmlReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        strategy_name: &str,
        output_path: &Path,
    ) -> Result<(), AtsimError> {
        let html = render(result, strategy_name)?;
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, html)?;
        info!(path = %output_path.display(), "html report written");
        Ok(())
    }
}
