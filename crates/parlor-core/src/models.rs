//! Domain entities backing the conversation store.
//!
//! These types are the store's view of the world, converted once from wire
//! records at the boundary. Presence is deliberately NOT stored on
//! [`Counterparty`]; it is overlaid at render time from the
//! [`crate::PresenceTracker`].

use parlor_proto::records::{ConversationRecord, MessageRecord, UserRecord};

/// Opaque user identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub String);

impl UserId {
    /// The identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Server-assigned message identity, unique within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(pub String);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The other participant in a one-to-one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterparty {
    /// Opaque identity.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique handle.
    pub username: String,
    /// Avatar URL, if set.
    pub avatar: Option<String>,
}

impl From<UserRecord> for Counterparty {
    fn from(record: UserRecord) -> Self {
        Self {
            id: UserId(record.id),
            name: record.name,
            username: record.username,
            avatar: record.avatar,
        }
    }
}

/// Whether a message was sent by this client or received from the
/// counterparty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Sent by this client.
    Outbound,
    /// Received from the counterparty.
    Inbound,
}

/// A single chat message in the open thread.
///
/// # Invariants
///
/// - A confirmed message has `id: Some` and `timestamp_ms: Some`; an
///   optimistic in-flight shadow has `id: None` and a `correlation` tag.
/// - Message identity is unique within a thread; merging a duplicate
///   identity is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Server identity. `None` while the message is an in-flight shadow.
    pub id: Option<MessageId>,
    /// Client-generated tag reconciling this shadow with its ack.
    pub correlation: Option<u64>,
    /// Send direction relative to this client.
    pub direction: Direction,
    /// Body text.
    pub body: String,
    /// Server timestamp, Unix milliseconds. `None` for in-flight shadows,
    /// which sort after all confirmed messages.
    pub timestamp_ms: Option<u64>,
    /// Delivered to the counterparty's device.
    pub delivered: bool,
    /// Seen by the counterparty (outbound) or by us (inbound).
    pub seen: bool,
}

impl Message {
    /// Build a confirmed message from a wire record.
    ///
    /// Direction is derived from the record's sender relative to `self_id`.
    pub fn from_record(record: MessageRecord, self_id: &UserId) -> Self {
        let direction = if record.sender_id == self_id.0 {
            Direction::Outbound
        } else {
            Direction::Inbound
        };
        Self {
            id: Some(MessageId(record.id)),
            correlation: None,
            direction,
            body: record.content,
            timestamp_ms: Some(record.created_at),
            delivered: record.delivered,
            seen: record.seen,
        }
    }

    /// Build an optimistic outbound shadow awaiting its ack.
    pub fn shadow(body: String, correlation: u64) -> Self {
        Self {
            id: None,
            correlation: Some(correlation),
            direction: Direction::Outbound,
            body,
            timestamp_ms: None,
            delivered: false,
            seen: false,
        }
    }

    /// True while this message awaits gateway confirmation.
    pub fn is_shadow(&self) -> bool {
        self.id.is_none()
    }
}

/// List-view metadata about a conversation, distinct from its history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    /// The counterparty.
    pub partner: Counterparty,
    /// Preview text of the most recent message.
    pub last_message: String,
    /// Timestamp of the most recent message, Unix milliseconds.
    pub last_message_at: u64,
    /// Messages not yet seen by this client.
    pub unread_count: u32,
}

impl ConversationSummary {
    /// Whether the conversation carries unseen messages.
    pub fn unread(&self) -> bool {
        self.unread_count > 0
    }
}

impl From<ConversationRecord> for ConversationSummary {
    fn from(record: ConversationRecord) -> Self {
        Self {
            partner: record.partner.into(),
            last_message: record.last_message,
            last_message_at: record.last_message_at,
            unread_count: record.unread_count,
        }
    }
}

/// The single open conversation.
///
/// Exactly one conversation is open at a time; the store holds this as a
/// single nullable slot, never a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveConversation {
    /// A conversation with existing history and a summary entry.
    Existing {
        /// The counterparty.
        partner: Counterparty,
    },
    /// A conversation opened before any message has been exchanged.
    ///
    /// Promoted to `Existing` when the first outbound message is
    /// acknowledged; discarded if closed before sending.
    Draft {
        /// The counterparty.
        partner: Counterparty,
    },
}

impl ActiveConversation {
    /// The counterparty regardless of mode.
    pub fn partner(&self) -> &Counterparty {
        match self {
            Self::Existing { partner } | Self::Draft { partner } => partner,
        }
    }

    /// True while in draft mode.
    pub fn is_draft(&self) -> bool {
        matches!(self, Self::Draft { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sender: &str, receiver: &str) -> MessageRecord {
        MessageRecord {
            id: "m1".into(),
            sender_id: sender.into(),
            receiver_id: receiver.into(),
            content: "hi".into(),
            delivered: false,
            seen: false,
            created_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn direction_derived_from_sender() {
        let me = UserId::from("u1");
        let sent = Message::from_record(record("u1", "u2"), &me);
        assert_eq!(sent.direction, Direction::Outbound);

        let received = Message::from_record(record("u2", "u1"), &me);
        assert_eq!(received.direction, Direction::Inbound);
    }

    #[test]
    fn shadow_has_no_identity() {
        let shadow = Message::shadow("hello".into(), 7);
        assert!(shadow.is_shadow());
        assert_eq!(shadow.correlation, Some(7));
        assert_eq!(shadow.timestamp_ms, None);
    }
}
