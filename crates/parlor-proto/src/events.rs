//! Event enums and the JSON envelope codec.
//!
//! Every frame on the gateway socket is `{"event": <name>, "data": <payload>}`.
//! The event name plays the role an opcode plays in a binary protocol: it
//! selects the payload shape. Dispatch is an exhaustive match in both
//! directions, so adding a variant without wiring its name is a compile
//! error.
//!
//! # Invariants
//!
//! - Name Uniqueness: each variant maps to exactly one event name, and each
//!   name to exactly one variant.
//! - Round Trip: encoding an event and decoding the result yields an equal
//!   value.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::HashMap;

use crate::{
    errors::{ProtocolError, Result},
    payloads::{inbound, outbound},
    records::{MessageRecord, UserRecord},
};

/// Envelope shape used for encoding.
#[derive(Serialize)]
struct WireEnvelope<'a, T: Serialize> {
    event: &'a str,
    data: &'a T,
}

/// Envelope shape used for decoding: name first, payload deferred.
#[derive(serde::Deserialize)]
struct RawEnvelope {
    event: String,
    #[serde(default)]
    data: Value,
}

fn encode_envelope<T: Serialize>(event: &'static str, data: &T) -> Result<String> {
    serde_json::to_string(&WireEnvelope { event, data })
        .map_err(|e| ProtocolError::Encode { event, reason: e.to_string() })
}

fn decode_payload<T: DeserializeOwned>(event: &'static str, data: Value) -> Result<T> {
    serde_json::from_value(data)
        .map_err(|e| ProtocolError::InvalidPayload { event, reason: e.to_string() })
}

/// Events the client emits to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    /// Send a message to a counterparty (`send_message`).
    SendMessage(outbound::SendMessage),
    /// Acknowledge a single message (`mark_message_seen`).
    MarkMessageSeen(outbound::MarkMessageSeen),
    /// Acknowledge an entire conversation (`mark_conversation_seen`).
    MarkConversationSeen(outbound::MarkConversationSeen),
    /// Counterparty should show a typing indicator (`typing_start`).
    TypingStart(outbound::TypingTarget),
    /// Counterparty should clear the typing indicator (`typing_stop`).
    TypingStop(outbound::TypingTarget),
    /// Subscribe to a conversation room (`join_conversation`).
    JoinConversation(outbound::ConversationRoom),
    /// Unsubscribe from a conversation room (`leave_conversation`).
    LeaveConversation(outbound::ConversationRoom),
    /// Request a presence snapshot (`get_online_status`).
    GetOnlineStatus(outbound::OnlineStatusQuery),
}

impl OutboundEvent {
    /// Wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SendMessage(_) => "send_message",
            Self::MarkMessageSeen(_) => "mark_message_seen",
            Self::MarkConversationSeen(_) => "mark_conversation_seen",
            Self::TypingStart(_) => "typing_start",
            Self::TypingStop(_) => "typing_stop",
            Self::JoinConversation(_) => "join_conversation",
            Self::LeaveConversation(_) => "leave_conversation",
            Self::GetOnlineStatus(_) => "get_online_status",
        }
    }

    /// Encode this event as a JSON envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Encode`] if serialization fails, which
    /// indicates a bug in our own payload types.
    pub fn encode(&self) -> Result<String> {
        let name = self.name();
        match self {
            Self::SendMessage(p) => encode_envelope(name, p),
            Self::MarkMessageSeen(p) => encode_envelope(name, p),
            Self::MarkConversationSeen(p) => encode_envelope(name, p),
            Self::TypingStart(p) | Self::TypingStop(p) => encode_envelope(name, p),
            Self::JoinConversation(p) | Self::LeaveConversation(p) => encode_envelope(name, p),
            Self::GetOnlineStatus(p) => encode_envelope(name, p),
        }
    }
}

/// Events the gateway delivers to the client.
///
/// Duplicate delivery is possible: the gateway offers no dedup, so every
/// consumer of these events must be idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Full presence snapshot, replaces any prior set (`online_users`).
    OnlineUsers(Vec<UserRecord>),
    /// A user came online (`user_online`).
    UserOnline(inbound::PresenceDelta),
    /// A user went offline (`user_offline`).
    UserOffline(inbound::PresenceDelta),
    /// A message arrived from a counterparty (`new_message`).
    NewMessage(MessageRecord),
    /// The gateway accepted one of our messages (`message_sent`).
    MessageSent(MessageRecord),
    /// The gateway rejected one of our messages (`message_error`).
    MessageErrored(inbound::MessageError),
    /// A counterparty saw one of our messages (`message_seen`).
    MessageSeen(inbound::MessageSeenAck),
    /// A counterparty saw the whole conversation (`conversation_seen`).
    ConversationSeen(inbound::ConversationSeenAck),
    /// A counterparty started typing (`user_typing`).
    UserTyping(inbound::TypingNotice),
    /// A counterparty stopped typing (`user_stopped_typing`).
    UserStoppedTyping(inbound::TypingNotice),
    /// Presence answers for a `get_online_status` query (`online_statuses`).
    OnlineStatuses(HashMap<String, bool>),
}

impl InboundEvent {
    /// Wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OnlineUsers(_) => "online_users",
            Self::UserOnline(_) => "user_online",
            Self::UserOffline(_) => "user_offline",
            Self::NewMessage(_) => "new_message",
            Self::MessageSent(_) => "message_sent",
            Self::MessageErrored(_) => "message_error",
            Self::MessageSeen(_) => "message_seen",
            Self::ConversationSeen(_) => "conversation_seen",
            Self::UserTyping(_) => "user_typing",
            Self::UserStoppedTyping(_) => "user_stopped_typing",
            Self::OnlineStatuses(_) => "online_statuses",
        }
    }

    /// Decode a JSON envelope received from the gateway.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::MalformedEnvelope`] if the text is not a JSON
    ///   object with an `event` field
    /// - [`ProtocolError::UnknownEvent`] for names outside the table
    /// - [`ProtocolError::InvalidPayload`] if the payload does not match the
    ///   shape the name requires
    pub fn decode(text: &str) -> Result<Self> {
        let raw: RawEnvelope = serde_json::from_str(text)
            .map_err(|e| ProtocolError::MalformedEnvelope { reason: e.to_string() })?;

        match raw.event.as_str() {
            "online_users" => Ok(Self::OnlineUsers(decode_payload("online_users", raw.data)?)),
            "user_online" => Ok(Self::UserOnline(decode_payload("user_online", raw.data)?)),
            "user_offline" => Ok(Self::UserOffline(decode_payload("user_offline", raw.data)?)),
            "new_message" => Ok(Self::NewMessage(decode_payload("new_message", raw.data)?)),
            "message_sent" => Ok(Self::MessageSent(decode_payload("message_sent", raw.data)?)),
            "message_error" => {
                Ok(Self::MessageErrored(decode_payload("message_error", raw.data)?))
            },
            "message_seen" => Ok(Self::MessageSeen(decode_payload("message_seen", raw.data)?)),
            "conversation_seen" => {
                Ok(Self::ConversationSeen(decode_payload("conversation_seen", raw.data)?))
            },
            "user_typing" => Ok(Self::UserTyping(decode_payload("user_typing", raw.data)?)),
            "user_stopped_typing" => {
                Ok(Self::UserStoppedTyping(decode_payload("user_stopped_typing", raw.data)?))
            },
            "online_statuses" => {
                Ok(Self::OnlineStatuses(decode_payload("online_statuses", raw.data)?))
            },
            _ => Err(ProtocolError::UnknownEvent { name: raw.event }),
        }
    }

    /// Encode this event as a JSON envelope.
    ///
    /// Used by tests and simulated gateways; production only decodes.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    pub fn encode(&self) -> Result<String> {
        let name = self.name();
        match self {
            Self::OnlineUsers(p) => encode_envelope(name, p),
            Self::UserOnline(p) | Self::UserOffline(p) => encode_envelope(name, p),
            Self::NewMessage(p) | Self::MessageSent(p) => encode_envelope(name, p),
            Self::MessageErrored(p) => encode_envelope(name, p),
            Self::MessageSeen(p) => encode_envelope(name, p),
            Self::ConversationSeen(p) => encode_envelope(name, p),
            Self::UserTyping(p) | Self::UserStoppedTyping(p) => encode_envelope(name, p),
            Self::OnlineStatuses(p) => encode_envelope(name, p),
        }
    }
}
