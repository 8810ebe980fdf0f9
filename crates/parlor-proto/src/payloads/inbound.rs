//! Payloads for gateway-to-client events.

use serde::{Deserialize, Serialize};

/// Payload for `user_online` and `user_offline`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceDelta {
    /// User whose presence changed.
    pub user_id: String,
}

/// Payload for `message_error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageError {
    /// Human-readable failure description from the gateway.
    pub error: String,
}

/// Payload for `message_seen`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSeenAck {
    /// Message the counterparty has seen.
    pub message_id: String,
}

/// Payload for `conversation_seen`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSeenAck {
    /// Counterparty who has seen the whole conversation.
    pub partner_id: String,
}

/// Payload for `user_typing` and `user_stopped_typing`.
///
/// The gateway may attach extra context fields; only the user id matters to
/// the client, so everything else is ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingNotice {
    /// User whose typing state changed.
    pub user_id: String,
}
