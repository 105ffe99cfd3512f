//! Support requests.
//!
//! Acknowledged and otherwise dropped: they never touch a ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use paydesk_core::{DomainError, DomainResult, TicketId};

pub const SUPPORT_REPLY: &str = "request sent; we will answer within 24 hours";

/// Non-blank free text from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportMessage {
    text: String,
}

impl SupportMessage {
    pub fn new(text: impl Into<String>) -> DomainResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::validation("message cannot be blank"));
        }
        Ok(Self { text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn acknowledge(&self, received_at: DateTime<Utc>) -> SupportAcknowledgement {
        SupportAcknowledgement {
            ticket_id: TicketId::new(),
            received_at,
            reply: SUPPORT_REPLY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportAcknowledgement {
    pub ticket_id: TicketId,
    pub received_at: DateTime<Utc>,
    pub reply: String,
}
