//! Payloads for client-to-gateway events.

use serde::{Deserialize, Serialize};

/// Payload for `send_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    /// Counterparty receiving the message.
    pub receiver_id: String,

    /// Message body.
    pub content: String,

    /// Message content type.
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

/// Message content type.
///
/// Only text is supported today; the field exists on the wire so richer
/// kinds can be added without an envelope change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Plain text body.
    Text,
}

/// Payload for `mark_message_seen`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkMessageSeen {
    /// Message being acknowledged.
    pub message_id: String,

    /// Original sender of that message.
    pub sender_id: String,
}

/// Payload for `mark_conversation_seen`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkConversationSeen {
    /// Counterparty whose conversation is now fully seen.
    pub partner_id: String,
}

/// Payload for `typing_start` and `typing_stop`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingTarget {
    /// Counterparty who should see (or stop seeing) the indicator.
    pub receiver_id: String,
}

/// Payload for `join_conversation` and `leave_conversation`.
///
/// A conversation room is a logical subscription scope on the gateway; the
/// client must re-join after every reconnect because subscriptions do not
/// survive the socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRoom {
    /// Counterparty identifying the one-to-one room.
    pub partner_id: String,
}

/// Payload for `get_online_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineStatusQuery {
    /// Users whose presence is being queried.
    pub user_ids: Vec<String>,
}
