//! Core domain types and logic.

pub mod algo;
pub mod backtest;
pub mod broker;
pub mod config_validation;
pub mod error;
pub mod feature;
pub mod metrics;
pub mod ohlcv;
pub mod panel;
pub mod portfolio;
pub mod schedule;
pub mod strategy;
pub mod universe;
pub mod weights;
pub mod window;
