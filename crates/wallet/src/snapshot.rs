use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use paydesk_core::WalletId;

use crate::transaction::Transaction;

/// Point-in-time read of a ledger, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    pub wallet_id: WalletId,
    pub balance: Decimal,
    pub accumulated_fees: Decimal,
    /// Display hint only (`balance * (1 - fee_rate)`).
    pub available_for_withdrawal: Decimal,
    pub fee_rate: Decimal,
    pub version: u64,
    /// Newest first.
    pub transactions: Vec<Transaction>,
}
