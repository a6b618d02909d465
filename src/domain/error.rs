//! Domain error types.

use crate::domain::universe::UniverseError;

/// Top-level error type for atsim.
#[derive(Debug, thiserror::Error)]
pub enum AtsimError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("[algo {algo}] missing features: {}", missing.join(", "))]
    MissingFeatures { algo: String, missing: Vec<String> },

    #[error("[algo {algo}] not enough assets to long/short: need {requested}, universe has {available}")]
    InsufficientUniverse {
        algo: String,
        requested: usize,
        available: usize,
    },

    #[error("duplicate feature name: {0}")]
    DuplicateFeature(String),

    #[error("unknown broker profile: {0}")]
    UnknownBroker(String),

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error("data shape mismatch: {reason}")]
    DataShape { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AtsimError {
    /// True for errors raised while configuring a run, before any bar is processed.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            AtsimError::ConfigParse { .. }
                | AtsimError::ConfigMissing { .. }
                | AtsimError::ConfigInvalid { .. }
                | AtsimError::MissingFeatures { .. }
                | AtsimError::InsufficientUniverse { .. }
                | AtsimError::DuplicateFeature(_)
                | AtsimError::UnknownBroker(_)
        )
    }
}

impl From<UniverseError> for AtsimError {
    fn from(err: UniverseError) -> Self {
        AtsimError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "tickers".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<&AtsimError> for std::process::ExitCode {
    fn from(err: &AtsimError) -> Self {
        let code: u8 = match err {
            AtsimError::Io(_) => 1,
            AtsimError::ConfigParse { .. }
            | AtsimError::ConfigMissing { .. }
            | AtsimError::ConfigInvalid { .. }
            | AtsimError::MissingFeatures { .. }
            | AtsimError::InsufficientUniverse { .. }
            | AtsimError::DuplicateFeature(_)
            | AtsimError::UnknownBroker(_) => 2,
            AtsimError::Data { .. } | AtsimError::NoData { .. } => 3,
            AtsimError::DataShape { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
