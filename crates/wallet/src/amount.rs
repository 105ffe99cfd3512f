//! Raw user input to ledger amounts.

use core::str::FromStr;

use rust_decimal::Decimal;

use crate::error::WalletError;

/// Parse a raw amount typed by the user.
///
/// Accepts plain decimals (`"2000"`, `" 500.01 "`) and scientific notation
/// (`"1e3"`). Rejects empty input, anything non-numeric (including trailing
/// garbage such as `"12abc"` and digit separators such as `"1_000"`), and
/// values that are zero or negative.
pub fn parse_amount(raw: &str) -> Result<Decimal, WalletError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(is_numeric_char) {
        return Err(WalletError::invalid_amount(raw));
    }

    let amount = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| WalletError::invalid_amount(raw))?;

    if amount <= Decimal::ZERO {
        return Err(WalletError::invalid_amount(raw));
    }
    Ok(amount)
}

// `Decimal::from_str` skips `_`, so filter the input first.
fn is_numeric_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')
}

/// Reject zero and negative amounts.
pub(crate) fn ensure_positive(amount: Decimal) -> Result<(), WalletError> {
    if amount <= Decimal::ZERO {
        return Err(WalletError::invalid_amount(amount.to_string()));
    }
    Ok(())
}
