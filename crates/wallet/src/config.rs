//! Ledger construction parameters.

use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const FEE_RATE_VAR: &str = "PAYDESK_FEE_RATE";
pub const SEED_BALANCE_VAR: &str = "PAYDESK_SEED_BALANCE";
pub const SEED_HISTORY_VAR: &str = "PAYDESK_SEED_HISTORY";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a decimal number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be true or false, got {value:?}")]
    InvalidFlag { var: &'static str, value: String },

    #[error("fee rate must be at least 0 and below 1, got {0}")]
    FeeRateOutOfRange(Decimal),

    #[error("seed balance must be positive, got {0}")]
    NonPositiveSeedBalance(Decimal),
}

/// Values a ledger is opened with.
///
/// `fee_rate` is the share of every withdrawal retained by the operator.
/// `seed_history` adds two demonstration transactions to a fresh ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    pub fee_rate: Decimal,
    pub seed_balance: Decimal,
    pub seed_history: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            fee_rate: Decimal::new(10, 2),
            seed_balance: Decimal::from(10_000),
            seed_history: true,
        }
    }
}

impl WalletConfig {
    /// Read overrides from the process environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`WalletConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(FEE_RATE_VAR) {
            config.fee_rate = parse_decimal(FEE_RATE_VAR, &value)?;
        }
        if let Some(value) = lookup(SEED_BALANCE_VAR) {
            config.seed_balance = parse_decimal(SEED_BALANCE_VAR, &value)?;
        }
        if let Some(value) = lookup(SEED_HISTORY_VAR) {
            config.seed_history = parse_flag(SEED_HISTORY_VAR, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fee_rate < Decimal::ZERO || self.fee_rate >= Decimal::ONE {
            return Err(ConfigError::FeeRateOutOfRange(self.fee_rate));
        }
        if self.seed_balance <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveSeedBalance(self.seed_balance));
        }
        Ok(())
    }
}

fn parse_decimal(var: &'static str, value: &str) -> Result<Decimal, ConfigError> {
    Decimal::from_str(value.trim()).map_err(|_| ConfigError::InvalidNumber {
        var,
        value: value.to_string(),
    })
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = WalletConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, WalletConfig::default());
        assert_eq!(config.fee_rate, Decimal::new(1, 1));
        assert_eq!(config.seed_balance, Decimal::from(10_000));
    }

    #[test]
    fn overrides_are_read() {
        let config = WalletConfig::from_lookup(lookup_from(&[
            (FEE_RATE_VAR, "0.05"),
            (SEED_BALANCE_VAR, "250.50"),
            (SEED_HISTORY_VAR, "false"),
        ]))
        .unwrap();

        assert_eq!(config.fee_rate, Decimal::new(5, 2));
        assert_eq!(config.seed_balance, Decimal::new(25050, 2));
        assert!(!config.seed_history);
    }

    #[test]
    fn malformed_values_name_the_variable() {
        let err = WalletConfig::from_lookup(lookup_from(&[(FEE_RATE_VAR, "ten percent")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                var: FEE_RATE_VAR,
                value: "ten percent".to_string()
            }
        );

        let err =
            WalletConfig::from_lookup(lookup_from(&[(SEED_HISTORY_VAR, "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFlag { .. }));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = WalletConfig::from_lookup(lookup_from(&[(FEE_RATE_VAR, "1")])).unwrap_err();
        assert_eq!(err, ConfigError::FeeRateOutOfRange(Decimal::ONE));

        let err =
            WalletConfig::from_lookup(lookup_from(&[(SEED_BALANCE_VAR, "-1")])).unwrap_err();
        assert_eq!(err, ConfigError::NonPositiveSeedBalance(Decimal::NEGATIVE_ONE));

        let err = WalletConfig::from_lookup(lookup_from(&[(SEED_BALANCE_VAR, "0")])).unwrap_err();
        assert_eq!(err, ConfigError::NonPositiveSeedBalance(Decimal::ZERO));
    }
}
