use chrono::{DateTime, Utc};

/// A domain-agnostic event.
///
/// Events are facts: once a ledger emits one it is never edited, only applied.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "wallet.ledger.funds_deposited").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
