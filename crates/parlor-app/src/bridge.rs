//! Store-to-view translation layer.
//!
//! The [`Bridge`] wraps the sans-IO [`parlor_core::Store`] and adapts it to
//! the view lifecycle.
//!
//! # Responsibilities
//!
//! - Converts high-level [`crate::ViewAction`] intents into store events.
//! - Accumulates outgoing gateway events and fetch requests for the driver
//!   to execute in the next I/O cycle.
//! - Converts store notices back into [`crate::ViewEvent`]s for the App.

use parlor_core::{
    Notice, Store, StoreAction, StoreEvent, UserId, env::Environment,
};
use parlor_proto::OutboundEvent;

use crate::{GatewayUpdate, ViewAction, ViewEvent};

/// A REST fetch the driver must run, tagged for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    /// Fetch the conversation list.
    Conversations {
        /// Generation to feed back with the completion.
        generation: u64,
    },
    /// Fetch message history with a counterparty.
    History {
        /// Counterparty whose history to fetch.
        partner_id: UserId,
        /// Generation to feed back with the completion.
        generation: u64,
    },
}

/// Bridge between the App and the conversation store.
///
/// Generic over Environment to support both production and virtual-time
/// testing.
pub struct Bridge<E: Environment> {
    store: Store<E>,
    outgoing: Vec<OutboundEvent>,
    fetches: Vec<FetchRequest>,
}

impl<E: Environment> Bridge<E> {
    /// Create a bridge for the given client identity.
    pub fn new(env: E, self_id: UserId) -> Self {
        Self { store: Store::new(env, self_id), outgoing: Vec::new(), fetches: Vec::new() }
    }

    /// The wrapped store, for rendering.
    pub fn store(&self) -> &Store<E> {
        &self.store
    }

    /// Process a view action and return resulting view events.
    ///
    /// Render/Quit never reach the bridge; the runtime handles them.
    pub fn process_view_action(&mut self, action: ViewAction) -> Vec<ViewEvent> {
        let event = match action {
            ViewAction::Refresh => StoreEvent::LoadConversations,
            ViewAction::Open { partner } => StoreEvent::OpenConversation { partner },
            ViewAction::Close => StoreEvent::CloseConversation,
            ViewAction::Send { body } => StoreEvent::SendMessage { body },
            ViewAction::Input { text } => StoreEvent::InputChanged { text },
            ViewAction::Render | ViewAction::Quit => return vec![],
        };
        self.apply(event)
    }

    /// Handle a gateway transport update.
    pub fn handle_gateway(&mut self, update: GatewayUpdate) -> Vec<ViewEvent> {
        match update {
            GatewayUpdate::Up => {
                let mut events = self.apply(StoreEvent::Connected);
                events.push(ViewEvent::ConnectionUp);
                events
            },
            GatewayUpdate::Down => {
                let mut events = self.apply(StoreEvent::Disconnected);
                events.push(ViewEvent::ConnectionDown);
                events
            },
            GatewayUpdate::Event(inbound) => self.apply(StoreEvent::Inbound(inbound)),
        }
    }

    /// Feed back a completed conversation-list fetch.
    pub fn complete_conversations(
        &mut self,
        generation: u64,
        result: Result<Vec<parlor_proto::records::ConversationRecord>, parlor_core::FetchFailure>,
    ) -> Vec<ViewEvent> {
        self.apply(StoreEvent::ConversationsLoaded { generation, result })
    }

    /// Feed back a completed history fetch.
    pub fn complete_history(
        &mut self,
        partner_id: UserId,
        generation: u64,
        result: Result<Vec<parlor_proto::records::MessageRecord>, parlor_core::FetchFailure>,
    ) -> Vec<ViewEvent> {
        self.apply(StoreEvent::HistoryLoaded { partner_id, generation, result })
    }

    /// Process a time tick.
    pub fn handle_tick(&mut self, now: E::Instant) -> Vec<ViewEvent> {
        self.apply(StoreEvent::Tick { now })
    }

    /// Take pending outgoing gateway events.
    pub fn take_outgoing(&mut self) -> Vec<OutboundEvent> {
        std::mem::take(&mut self.outgoing)
    }

    /// Take pending fetch requests.
    pub fn take_fetches(&mut self) -> Vec<FetchRequest> {
        std::mem::take(&mut self.fetches)
    }

    fn apply(&mut self, event: StoreEvent<E::Instant>) -> Vec<ViewEvent> {
        match self.store.handle(event) {
            Ok(actions) => {
                let mut events = Vec::new();
                for action in actions {
                    match action {
                        StoreAction::Emit(outbound) => self.outgoing.push(outbound),
                        StoreAction::FetchConversations { generation } => {
                            self.fetches.push(FetchRequest::Conversations { generation });
                        },
                        StoreAction::FetchHistory { partner_id, generation } => {
                            self.fetches.push(FetchRequest::History { partner_id, generation });
                        },
                        StoreAction::Notice(notice) => {
                            events.push(ViewEvent::Notice { message: notice_text(&notice) });
                        },
                    }
                }
                events.push(ViewEvent::StoreUpdated);
                events
            },
            Err(e) => {
                tracing::debug!(error = %e, "store rejected view action");
                vec![ViewEvent::Notice { message: e.to_string() }]
            },
        }
    }
}

/// User-facing text for a store notice.
fn notice_text(notice: &Notice) -> String {
    match notice {
        Notice::SendFailed { reason } => format!("Message not sent: {reason}"),
        Notice::LoadFailed { reason } => format!("Could not load conversations: {reason}"),
        Notice::HistoryFailed { reason } => format!("Could not load messages: {reason}"),
        Notice::QueueFull { .. } => "Still offline, action dropped".to_owned(),
    }
}
