//! Store events and actions.
//!
//! The caller is responsible for:
//! - Receiving gateway events from the transport and feeding them in
//! - Running REST fetches when asked and feeding the completions back,
//!   tagged with the generation the request carried
//! - Driving time forward via ticks
//! - Forwarding user intents (open, send, keystrokes)
//!
//! Generic over `I` (instant type) to support both production
//! (`std::time::Instant`) and virtual-time test environments.

use parlor_proto::{InboundEvent, OutboundEvent};
use parlor_proto::records::{ConversationRecord, MessageRecord};

use crate::models::{Counterparty, UserId};

/// A failed REST fetch, reported back to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// Human-readable failure description.
    pub reason: String,
}

/// Events fed into the store.
#[derive(Debug, Clone)]
pub enum StoreEvent<I = std::time::Instant> {
    /// User intent: load (or reload) the conversation list.
    LoadConversations,

    /// User intent: open a conversation with this counterparty.
    ///
    /// Enters existing-chat mode when a summary exists for the
    /// counterparty, draft mode otherwise.
    OpenConversation {
        /// Counterparty to open.
        partner: Counterparty,
    },

    /// User intent: close the open conversation and return to the list.
    CloseConversation,

    /// User intent: send a message to the open conversation.
    SendMessage {
        /// Message body; ignored when blank.
        body: String,
    },

    /// User intent: the compose input changed.
    InputChanged {
        /// Current input text.
        text: String,
    },

    /// Transport established (or re-established) the gateway connection.
    Connected,

    /// Transport lost the gateway connection.
    Disconnected,

    /// A decoded event arrived from the gateway.
    Inbound(InboundEvent),

    /// A conversation-list fetch completed.
    ConversationsLoaded {
        /// Generation the fetch was started with.
        generation: u64,
        /// Fetched records, or the failure.
        result: Result<Vec<ConversationRecord>, FetchFailure>,
    },

    /// A message-history fetch completed.
    HistoryLoaded {
        /// Counterparty the history belongs to.
        partner_id: UserId,
        /// Generation the fetch was started with.
        generation: u64,
        /// Fetched records, or the failure.
        result: Result<Vec<MessageRecord>, FetchFailure>,
    },

    /// Time tick for timeout processing.
    ///
    /// The caller should send ticks periodically so the store can fire the
    /// typing debounce timer and expire stale indicators.
    Tick {
        /// Current time from the environment.
        now: I,
    },
}

/// Actions the store produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreAction {
    /// Emit an event on the gateway socket.
    ///
    /// Only produced while the store believes the transport is connected;
    /// intents raised while disconnected are queued internally.
    Emit(OutboundEvent),

    /// Start a conversation-list fetch.
    ///
    /// The completion must be fed back as
    /// [`StoreEvent::ConversationsLoaded`] carrying this generation.
    FetchConversations {
        /// Generation tag invalidating stale completions.
        generation: u64,
    },

    /// Start a message-history fetch for a counterparty.
    ///
    /// The completion must be fed back as [`StoreEvent::HistoryLoaded`]
    /// carrying this generation.
    FetchHistory {
        /// Counterparty whose history to fetch.
        partner_id: UserId,
        /// Generation tag invalidating stale completions.
        generation: u64,
    },

    /// Surface a user-visible notice.
    Notice(Notice),
}

/// User-visible, non-fatal notices.
///
/// Every failure surfaces as a notice plus a safe fallback state; nothing
/// propagates to the view layer as an unhandled error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The gateway rejected a send; the optimistic entry was rolled back.
    SendFailed {
        /// Gateway-provided description.
        reason: String,
    },

    /// The conversation-list fetch failed; the previous list is kept.
    LoadFailed {
        /// Fetch failure description.
        reason: String,
    },

    /// The history fetch failed; the thread opens empty.
    HistoryFailed {
        /// Fetch failure description.
        reason: String,
    },

    /// The disconnected outbound queue is full; the intent was dropped.
    QueueFull {
        /// Queue capacity that was exceeded.
        capacity: usize,
    },
}
