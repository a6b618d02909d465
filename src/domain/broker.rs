//! Broker profiles: flat commission per share traded.

use crate::domain::error::AtsimError;

pub const DEFAULT_BROKER: &str = "IB";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrokerProfile {
    pub key: &'static str,
    pub commission_per_share: f64,
}

const PROFILES: &[BrokerProfile] = &[
    BrokerProfile {
        key: "IB",
        commission_per_share: 0.005,
    },
    BrokerProfile {
        key: "ZERO",
        commission_per_share: 0.0,
    },
];

/// Look up a profile by key, ignoring case.
pub fn lookup(key: &str) -> Result<BrokerProfile, AtsimError> {
    let wanted = key.trim();
    PROFILES
        .iter()
        .find(|p| p.key.eq_ignore_ascii_case(wanted))
        .copied()
        .ok_or_else(|| AtsimError::UnknownBroker(wanted.to_string()))
}
