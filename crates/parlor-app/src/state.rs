//! Observable view state types.
//!
//! These structures are the "view model" for the messaging panel: the
//! subset of state a frontend needs for rendering, without exposing the
//! synchronization machinery underneath.

use parlor_core::{ActiveConversation, ConversationSummary, Message, PresenceTracker};

/// Which pane has focus when the layout shows one pane at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    /// Conversation list.
    List,
    /// Open thread.
    Thread,
}

/// One assembled frame of everything a renderer needs.
///
/// Built by the runtime from the App and the store before each render;
/// borrows everything, owns nothing.
#[derive(Debug)]
pub struct ViewFrame<'a> {
    /// Whether the messaging panel is open at all.
    pub panel_open: bool,
    /// Focused pane for single-pane layouts.
    pub pane: Pane,
    /// Whether the viewport is narrow enough to show one pane at a time.
    pub collapsed: bool,
    /// Current compose input text.
    pub compose: &'a str,
    /// Transient status line, if any.
    pub status: Option<&'a str>,
    /// Whether the gateway socket is up.
    pub connected: bool,
    /// Conversation summaries in list order.
    pub summaries: &'a [ConversationSummary],
    /// The open conversation, if any.
    pub active: Option<&'a ActiveConversation>,
    /// Messages of the open conversation, oldest first.
    pub thread: &'a [Message],
    /// Presence overlay for online dots.
    pub presence: &'a PresenceTracker,
    /// Whether the open conversation's counterparty is typing.
    pub partner_typing: bool,
    /// Sum of unread counts across all conversations, for the panel badge.
    pub total_unread: u32,
}
