use rust_decimal::Decimal;
use thiserror::Error;

/// Why the ledger refused a deposit or withdrawal.
///
/// Both variants are recoverable: the ledger is left exactly as it was and
/// the caller is expected to ask the user for a different amount.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Input is not a positive, representable number.
    #[error("invalid amount: {input:?}")]
    InvalidAmount { input: String },

    /// Withdrawal gross amount exceeds the current balance.
    #[error("insufficient funds: requested {requested}, balance {balance}")]
    InsufficientFunds { balance: Decimal, requested: Decimal },
}

impl WalletError {
    pub fn invalid_amount(input: impl Into<String>) -> Self {
        Self::InvalidAmount {
            input: input.into(),
        }
    }
}
