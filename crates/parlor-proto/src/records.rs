//! Wire records shared by the gateway and the REST messaging API.
//!
//! Field names follow the backend's camelCase convention. All records are
//! plain data: identity semantics (dedup, ordering, direction) live in the
//! domain layer, not here.

use serde::{Deserialize, Serialize};

/// A remote user as the backend describes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Opaque user identity.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Unique handle (without the leading `@`).
    pub username: String,

    /// Avatar URL. `None` when the user has no avatar set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A single chat message on the wire.
///
/// Both `new_message` / `message_sent` gateway events and the REST history
/// endpoint carry this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    /// Server-assigned message identity, unique within a conversation.
    pub id: String,

    /// Sender user id.
    pub sender_id: String,

    /// Receiver user id.
    pub receiver_id: String,

    /// Message body.
    pub content: String,

    /// Delivered to the receiver's device.
    #[serde(default)]
    pub delivered: bool,

    /// Seen by the receiver.
    #[serde(default)]
    pub seen: bool,

    /// Creation time, Unix milliseconds UTC. The server clock is the only
    /// ordering authority; clients never compare against local time.
    pub created_at: u64,
}

/// One entry in the conversation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    /// The counterparty in this one-to-one conversation.
    pub partner: UserRecord,

    /// Preview text of the most recent message.
    #[serde(default)]
    pub last_message: String,

    /// Timestamp of the most recent message, Unix milliseconds UTC.
    pub last_message_at: u64,

    /// Number of messages not yet seen by this client.
    #[serde(default)]
    pub unread_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_record_defaults_flags() {
        let json = r#"{
            "id": "m1",
            "senderId": "u1",
            "receiverId": "u2",
            "content": "hi",
            "createdAt": 1700000000000
        }"#;

        let record: MessageRecord = serde_json::from_str(json).unwrap();
        assert!(!record.delivered);
        assert!(!record.seen);
        assert_eq!(record.created_at, 1_700_000_000_000);
    }

    #[test]
    fn user_record_omits_missing_avatar() {
        let user = UserRecord {
            id: "u1".into(),
            name: "Ada".into(),
            username: "ada".into(),
            avatar: None,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("avatar"));
    }
}
