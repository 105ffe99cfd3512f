//! Process configuration read from the environment.

use std::net::SocketAddr;

use thiserror::Error;

use paydesk_wallet::{ConfigError, WalletConfig};

pub const BIND_ADDR_VAR: &str = "PAYDESK_BIND_ADDR";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ApiConfigError {
    #[error("PAYDESK_BIND_ADDR must be host:port, got {0:?}")]
    InvalidBindAddr(String),

    #[error(transparent)]
    Wallet(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub wallet: WalletConfig,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ApiConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiConfigError> {
        let raw = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw
            .trim()
            .parse()
            .map_err(|_| ApiConfigError::InvalidBindAddr(raw.clone()))?;

        Ok(Self {
            bind_addr,
            wallet: WalletConfig::from_lookup(&lookup)?,
        })
    }
}
