//! Wallet module (in-memory ledger, event-sourced).
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns. Callers
//! hand raw user input to the [`Ledger`] and render whatever it returns.

pub mod amount;
pub mod config;
pub mod error;
pub mod ledger;
pub mod snapshot;
pub mod support;
pub mod transaction;

pub use amount::parse_amount;
pub use config::{ConfigError, WalletConfig};
pub use error::WalletError;
pub use ledger::{
    Deposit, FundsDeposited, FundsWithdrawn, Ledger, WalletCommand, WalletEvent, Withdraw,
};
pub use snapshot::WalletSnapshot;
pub use support::{SupportAcknowledgement, SupportMessage};
pub use transaction::{Transaction, TransactionKind, TransactionStatus};
