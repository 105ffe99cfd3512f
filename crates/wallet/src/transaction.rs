use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use paydesk_core::{Entity, TransactionId, ValueObject};

pub const DEPOSIT_DESCRIPTION: &str = "account top-up";
pub const WITHDRAWAL_DESCRIPTION: &str = "withdrawal to card";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    /// Reserved; no ledger operation produces purchases yet.
    Purchase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
    /// Reserved for operations that settle asynchronously.
    Pending,
    /// Reserved for operations that are recorded despite failing.
    Failed,
}

/// One recorded ledger operation (immutable once created).
///
/// `amount` is always the gross amount the user asked for. For withdrawals
/// the user receives [`Transaction::net_amount`], which is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    kind: TransactionKind,
    amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fee: Option<Decimal>,
    status: TransactionStatus,
    timestamp: DateTime<Utc>,
    description: String,
}

impl Transaction {
    pub(crate) fn deposit(id: TransactionId, amount: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: TransactionKind::Deposit,
            amount,
            fee: None,
            status: TransactionStatus::Completed,
            timestamp,
            description: DEPOSIT_DESCRIPTION.to_string(),
        }
    }

    pub(crate) fn withdrawal(
        id: TransactionId,
        amount: Decimal,
        fee: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind: TransactionKind::Withdrawal,
            amount,
            fee: Some(fee),
            status: TransactionStatus::Completed,
            timestamp,
            description: WITHDRAWAL_DESCRIPTION.to_string(),
        }
    }

    pub fn id_typed(&self) -> TransactionId {
        self.id
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn fee(&self) -> Option<Decimal> {
        self.fee
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// What actually reaches the user: gross amount minus any fee.
    pub fn net_amount(&self) -> Decimal {
        self.amount - self.fee.unwrap_or(Decimal::ZERO)
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl ValueObject for Transaction {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn withdrawal_net_amount_subtracts_fee() {
        let tx = Transaction::withdrawal(
            TransactionId::new(),
            Decimal::from(2000),
            Decimal::from(200),
            Utc::now(),
        );
        assert_eq!(tx.net_amount(), Decimal::from(1800));
        assert_eq!(tx.description(), WITHDRAWAL_DESCRIPTION);
    }

    #[test]
    fn deposit_has_no_fee_and_full_net() {
        let tx = Transaction::deposit(TransactionId::new(), Decimal::from(5000), Utc::now());
        assert_eq!(tx.fee(), None);
        assert_eq!(tx.net_amount(), Decimal::from(5000));
        assert_eq!(tx.status(), TransactionStatus::Completed);
    }

    #[test]
    fn json_uses_lowercase_tags_and_omits_absent_fee() {
        let tx = Transaction::deposit(TransactionId::new(), Decimal::from(5), Utc::now());
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["kind"], "deposit");
        assert_eq!(json["status"], "completed");
        assert!(json.get("fee").is_none());
    }
}
