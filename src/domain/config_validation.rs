//! Configuration validation.
//!
//! Checks every `[backtest]` and `[strategy]` field before any data is
//! loaded. Algo dependency and universe-size checks need the built features
//! and run later, at strategy setup.

use crate::domain::broker;
use crate::domain::error::AtsimError;
use crate::domain::feature::parse_feature_list;
use crate::domain::schedule::parse_schedule;
use crate::domain::universe::parse_tickers;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const ALGO_LONG_SHORT: &str = "long_short";

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), AtsimError> {
    validate_tickers(config)?;
    validate_initial_capital(config)?;
    validate_broker(config)?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), AtsimError> {
    validate_features(config)?;
    validate_algo(config)?;
    validate_counts(config)?;
    validate_schedule(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> AtsimError {
    AtsimError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn missing(section: &str, key: &str) -> AtsimError {
    AtsimError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn validate_tickers(config: &dyn ConfigPort) -> Result<(), AtsimError> {
    let tickers = config
        .get_value("backtest", "tickers")
        .ok_or_else(|| missing("backtest", "tickers"))?;
    parse_tickers(&tickers)?;
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), AtsimError> {
    if let Some(raw) = config.get_value("backtest", "initial_capital") {
        let value: f64 = raw
            .parse()
            .map_err(|_| invalid("backtest", "initial_capital", format!("not a number: '{}'", raw)))?;
        if !(value.is_finite() && value > 0.0) {
            return Err(invalid(
                "backtest",
                "initial_capital",
                "initial_capital must be positive",
            ));
        }
    }
    Ok(())
}

fn validate_broker(config: &dyn ConfigPort) -> Result<(), AtsimError> {
    let key = config
        .get_value("backtest", "broker")
        .unwrap_or_else(|| broker::DEFAULT_BROKER.to_string());
    broker::lookup(&key)?;
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), AtsimError> {
    let start = parse_optional_date(config, "start_date")?;
    let end = parse_optional_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(invalid(
                "backtest",
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }
    Ok(())
}

/// Read an optional `YYYY-MM-DD` key from `[backtest]`.
pub fn parse_optional_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, AtsimError> {
    config
        .get_value("backtest", key)
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| {
                invalid(
                    "backtest",
                    key,
                    format!("invalid {} format, expected YYYY-MM-DD", key),
                )
            })
        })
        .transpose()
}

fn validate_features(config: &dyn ConfigPort) -> Result<(), AtsimError> {
    let features = config
        .get_value("strategy", "features")
        .ok_or_else(|| missing("strategy", "features"))?;
    let specs = parse_feature_list(&features)?;

    if config.get_value("strategy", "factor").is_none() && specs.len() != 1 {
        return Err(missing("strategy", "factor"));
    }
    Ok(())
}

fn validate_algo(config: &dyn ConfigPort) -> Result<(), AtsimError> {
    match config.get_value("strategy", "algo") {
        None => Ok(()),
        Some(a) if a.eq_ignore_ascii_case(ALGO_LONG_SHORT) => Ok(()),
        Some(a) => Err(invalid("strategy", "algo", format!("unknown algo '{}'", a))),
    }
}

/// Read a non-negative count from `[strategy]`.
pub fn parse_count(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, AtsimError> {
    match config.get_value("strategy", key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| {
            invalid(
                "strategy",
                key,
                format!("expected a non-negative integer, got '{}'", raw),
            )
        }),
    }
}

fn validate_counts(config: &dyn ConfigPort) -> Result<(), AtsimError> {
    parse_count(config, "n_long", 3)?;
    parse_count(config, "n_short", 3)?;
    Ok(())
}

fn validate_schedule(config: &dyn ConfigPort) -> Result<(), AtsimError> {
    if let Some(s) = config.get_value("strategy", "schedule") {
        parse_schedule(&s)?;
    }
    Ok(())
}
