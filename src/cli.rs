//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_equity_adapter::CsvEquityAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report_adapter::HtmlReportAdapter;
use crate::domain::algo::AlgoSpec;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::broker;
use crate::domain::config_validation::{
    parse_count, parse_optional_date, validate_backtest_config, validate_strategy_config,
};
use crate::domain::error::AtsimError;
use crate::domain::feature::parse_feature_list;
use crate::domain::metrics::Summary;
use crate::domain::panel::PricePanel;
use crate::domain::schedule::parse_schedule;
use crate::domain::strategy::Strategy;
use crate::domain::universe::Universe;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PanelSource;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_REPORT: &str = "report.html";

#[derive(Parser, Debug)]
#[command(name = "atsim", about = "Bar-by-bar backtester for long/short allocation strategies")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// HTML report path, overrides [report] output
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Validate and set up the strategy without loading data
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest(&config, output.as_deref())
            }
        }
        Command::Validate { config } => run_validate(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, AtsimError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), AtsimError> {
    validate_backtest_config(config)?;
    validate_strategy_config(config)
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, AtsimError> {
    let broker_key = config
        .get_value("backtest", "broker")
        .unwrap_or_else(|| broker::DEFAULT_BROKER.to_string());
    let profile = broker::lookup(&broker_key)?;

    let bt_config = BacktestConfig {
        initial_capital: config.get_double(
            "backtest",
            "initial_capital",
            backtest_engine::DEFAULT_INITIAL_CAPITAL,
        ),
        commission_per_share: profile.commission_per_share,
    };
    bt_config.validate()?;
    Ok(bt_config)
}

pub fn build_universe(config: &dyn ConfigPort) -> Result<Universe, AtsimError> {
    let tickers = config
        .get_value("backtest", "tickers")
        .ok_or_else(|| AtsimError::ConfigMissing {
            section: "backtest".into(),
            key: "tickers".into(),
        })?;
    Ok(Universe::parse(&tickers)?)
}

pub fn build_algo_spec(config: &dyn ConfigPort, feature_names: &[String]) -> Result<AlgoSpec, AtsimError> {
    let factor = match config.get_value("strategy", "factor") {
        Some(f) => f,
        None => match feature_names {
            [only] => only.clone(),
            _ => {
                return Err(AtsimError::ConfigMissing {
                    section: "strategy".into(),
                    key: "factor".into(),
                })
            }
        },
    };

    Ok(AlgoSpec::LongShort {
        factor,
        n_long: parse_count(config, "n_long", 3)?,
        n_short: parse_count(config, "n_short", 3)?,
    })
}

/// Build the configured strategy against `universe`. All configuration
/// errors surface here, before any bar is processed.
pub fn build_strategy(config: &dyn ConfigPort, universe: &Universe) -> Result<Strategy, AtsimError> {
    let name = config
        .get_value("strategy", "name")
        .unwrap_or_else(|| "Unnamed".to_string());

    let features_str = config
        .get_value("strategy", "features")
        .ok_or_else(|| AtsimError::ConfigMissing {
            section: "strategy".into(),
            key: "features".into(),
        })?;
    let specs = parse_feature_list(&features_str)?;
    let names: Vec<String> = specs.iter().map(|s| s.name.clone()).collect();

    let algo = build_algo_spec(config, &names)?.build();
    let schedule = config
        .get_value("strategy", "schedule")
        .map(|s| parse_schedule(&s))
        .transpose()?;

    Strategy::new(
        &name,
        specs.iter().map(|s| s.build()).collect(),
        algo,
        schedule,
        universe,
    )
}

/// Fetch every ticker's history and join it into one panel.
pub fn load_panel(
    data: &dyn PanelSource,
    universe: &Universe,
    config: &dyn ConfigPort,
) -> Result<PricePanel, AtsimError> {
    let start = parse_optional_date(config, "start_date")?;
    let end = parse_optional_date(config, "end_date")?;

    let mut series = Vec::with_capacity(universe.len());
    for ticker in universe.tickers() {
        let bars = data.fetch_bars(ticker, start, end)?;
        if bars.is_empty() {
            return Err(AtsimError::NoData {
                ticker: ticker.clone(),
            });
        }
        series.push(bars);
    }

    let panel = PricePanel::assemble(universe.clone(), series)?;
    info!(tickers = universe.len(), rows = panel.len(), "price panel assembled");
    Ok(panel)
}

/// Everything after config loading: validate, load data, run, report.
pub fn run_backtest_pipeline(
    config: &dyn ConfigPort,
    data: &dyn PanelSource,
    output_override: Option<&Path>,
) -> Result<BacktestResult, AtsimError> {
    validate_config(config)?;
    let bt_config = build_backtest_config(config)?;
    let universe = build_universe(config)?;
    let mut strategy = build_strategy(config, &universe)?;

    let panel = load_panel(data, &universe, config)?;
    if panel.len() <= strategy.required_lookback() + 1 {
        warn!(
            rows = panel.len(),
            lookback = strategy.required_lookback(),
            "not enough rows to fill any decision; the run will hold cash"
        );
    }

    let result = backtest_engine::run_backtest(&panel, &mut strategy, &bt_config)?;
    print_summary(strategy.name(), &result);

    let output = output_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_value("report", "output").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT));
    HtmlReportAdapter::new().write(&result, strategy.name(), &output)?;
    eprintln!("\nReport written to: {}", output.display());

    if let Some(csv_path) = config.get_value("report", "equity_csv") {
        CsvEquityAdapter.write(&result, strategy.name(), Path::new(&csv_path))?;
        eprintln!("Equity series written to: {}", csv_path);
    }

    Ok(result)
}

fn print_summary(name: &str, result: &BacktestResult) {
    let summary = Summary::compute(result.equity_curve());
    eprintln!("\n=== {} ===", name);
    eprintln!("Bars:             {}", summary.bars);
    eprintln!("Final Equity:     {:.2}", summary.final_equity);
    eprintln!("Total Return:     {:.2}%", summary.total_return * 100.0);
    eprintln!("CAGR:             {:.2}%", summary.cagr * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", summary.sharpe_ratio);
    eprintln!("Max Drawdown:     -{:.1}%", summary.max_drawdown * 100.0);
    eprintln!("Rebalances:       {}", result.rebalances.len());
    eprintln!("Commission:       {:.2}", result.total_commission());
}

fn run_backtest(config_path: &Path, output: Option<&Path>) -> Result<(), AtsimError> {
    let config = load_config(config_path)?;
    let data_dir = config
        .get_value("backtest", "data_dir")
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
    let data = CsvAdapter::new(PathBuf::from(data_dir));
    run_backtest_pipeline(&config, &data, output)?;
    Ok(())
}

pub fn run_dry_run(config_path: &Path) -> Result<(), AtsimError> {
    let config = load_config(config_path)?;
    validate_config(&config)?;
    let bt_config = build_backtest_config(&config)?;
    let universe = build_universe(&config)?;
    let strategy = build_strategy(&config, &universe)?;

    eprintln!("Strategy:         {}", strategy.name());
    eprintln!("Tickers:          {}", universe.tickers().join(", "));
    eprintln!("Features:         {}", strategy.feature_names().join(", "));
    eprintln!("Lookback:         {} bars", strategy.required_lookback());
    eprintln!("Initial Capital:  {:.2}", bt_config.initial_capital);
    eprintln!("Commission/share: {}", bt_config.commission_per_share);
    eprintln!("\nDry run complete: configuration is valid");
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), AtsimError> {
    let config = load_config(config_path)?;
    validate_config(&config)?;
    build_backtest_config(&config)?;
    let universe = build_universe(&config)?;
    build_strategy(&config, &universe)?;
    eprintln!("Configuration is valid.");
    Ok(())
}
