use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use paydesk_wallet::{SupportAcknowledgement, Transaction, WalletSnapshot};

// -------------------------
// Request DTOs
// -------------------------

/// Amount as typed by the user: normally a JSON string or number.
///
/// Any other JSON value is passed on as its text so the ledger rejects it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Text(String),
    Number(serde_json::Number),
    Other(Value),
}

impl RawAmount {
    pub fn as_input(&self) -> String {
        match self {
            RawAmount::Text(s) => s.clone(),
            RawAmount::Number(n) => n.to_string(),
            RawAmount::Other(v) => v.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    #[serde(default)]
    pub amount: Option<RawAmount>,
}

impl AmountRequest {
    /// Missing or null amounts reach the ledger as empty input.
    pub fn raw_amount(&self) -> String {
        self.amount
            .as_ref()
            .map(RawAmount::as_input)
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct SupportRequest {
    #[serde(default)]
    pub message: Option<String>,
}

// -------------------------
// Response mapping
// -------------------------

/// Decimals go out as normalized strings ("8000", not "8000.00").
pub fn money(value: Decimal) -> String {
    value.normalize().to_string()
}

pub fn transaction_to_json(tx: &Transaction) -> Value {
    json!({
        "id": tx.id_typed().to_string(),
        "kind": tx.kind(),
        "amount": money(tx.amount()),
        "fee": tx.fee().map(money),
        "net_amount": money(tx.net_amount()),
        "status": tx.status(),
        "timestamp": tx.timestamp().to_rfc3339(),
        "description": tx.description(),
    })
}

pub fn snapshot_to_json(snapshot: &WalletSnapshot) -> Value {
    json!({
        "wallet_id": snapshot.wallet_id.to_string(),
        "balance": money(snapshot.balance),
        "accumulated_fees": money(snapshot.accumulated_fees),
        "available_for_withdrawal": money(snapshot.available_for_withdrawal),
        "fee_rate": money(snapshot.fee_rate),
        "version": snapshot.version,
        "transactions": snapshot.transactions.iter().map(transaction_to_json).collect::<Vec<_>>(),
    })
}

pub fn acknowledgement_to_json(ack: &SupportAcknowledgement) -> Value {
    json!({
        "ticket_id": ack.ticket_id.to_string(),
        "received_at": ack.received_at.to_rfc3339(),
        "message": ack.reply,
    })
}
