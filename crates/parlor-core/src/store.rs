//! Conversation store state machine.
//!
//! The `Store` is the single writer for all conversation state: the summary
//! list, the open thread, presence, and typing. The view layer dispatches
//! intents and renders; it never mutates store state directly. All three
//! concurrent sources of truth (optimistic local mutation, REST fetch
//! completions, gateway events) funnel through [`Store::handle`], which is
//! the only entry point.
//!
//! # Reconciliation rules
//!
//! - The summary list is replaced wholesale by every completed list fetch;
//!   optimistic edits made in the meantime are intentionally lost to the
//!   authoritative copy.
//! - The open thread is merged by message identity and kept ordered by
//!   server timestamp; duplicate delivery of the same identity is a no-op.
//! - Fetch completions carry the generation their request was tagged with;
//!   a completion whose generation no longer matches is discarded, so a
//!   late history response can never leak into a different conversation.

use std::collections::VecDeque;

use parlor_proto::payloads::outbound::{
    ConversationRoom, MarkConversationSeen, MessageKind, OnlineStatusQuery, SendMessage,
    TypingTarget,
};
use parlor_proto::records::MessageRecord;
use parlor_proto::{InboundEvent, OutboundEvent};

use crate::{
    env::Environment,
    error::StoreError,
    event::{FetchFailure, Notice, StoreAction, StoreEvent},
    models::{ActiveConversation, Counterparty, ConversationSummary, Message, MessageId, UserId},
    presence::{PresenceTracker, statuses_from_wire},
    typing::{TypingDebouncer, TypingIndicators, TypingSignal},
};

/// Maximum number of outbound intents held while disconnected.
///
/// Overflow drops the new intent and surfaces [`Notice::QueueFull`] rather
/// than growing without bound.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 32;

/// Lifecycle phase of the store.
///
/// The `sending` latch is orthogonal to the phase: a send can be in flight
/// only while the phase is `ConversationReady`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing loaded yet.
    Idle,
    /// Initial conversation-list fetch in flight.
    LoadingList,
    /// List available, no conversation open.
    ListReady,
    /// Conversation selected, history fetch in flight.
    OpeningConversation,
    /// Conversation open and interactive.
    ConversationReady,
}

/// Outcome of routing an outbound event through the connectivity gate.
enum EmitOutcome {
    /// Handed to the transport.
    Sent,
    /// Held in the disconnected queue.
    Queued,
    /// Dropped; a `QueueFull` notice was surfaced.
    Dropped,
}

/// Client-side conversation synchronization state machine.
pub struct Store<E: Environment> {
    env: E,
    /// This client's own user id, used to derive message direction.
    self_id: UserId,
    phase: Phase,
    connected: bool,
    summaries: Vec<ConversationSummary>,
    active: Option<ActiveConversation>,
    /// Messages of the open conversation, ordered by server timestamp with
    /// in-flight shadows at the end. Discarded on close.
    thread: Vec<Message>,
    /// Send latch: at most one message in flight at a time.
    sending: bool,
    presence: PresenceTracker,
    typing_out: TypingDebouncer<E::Instant>,
    typing_in: TypingIndicators<E::Instant>,
    /// Invalidates in-flight list fetches.
    list_generation: u64,
    /// Invalidates in-flight history fetches.
    history_generation: u64,
    outbound_queue: VecDeque<OutboundEvent>,
    queue_capacity: usize,
}

impl<E: Environment> Store<E> {
    /// Create a store for the given client identity.
    pub fn new(env: E, self_id: UserId) -> Self {
        Self {
            env,
            self_id,
            phase: Phase::Idle,
            connected: false,
            summaries: Vec::new(),
            active: None,
            thread: Vec::new(),
            sending: false,
            presence: PresenceTracker::new(),
            typing_out: TypingDebouncer::new(),
            typing_in: TypingIndicators::new(),
            list_generation: 0,
            history_generation: 0,
            outbound_queue: VecDeque::new(),
            queue_capacity: OUTBOUND_QUEUE_CAPACITY,
        }
    }

    /// Override the disconnected-queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Process an event and return resulting actions.
    pub fn handle(
        &mut self,
        event: StoreEvent<E::Instant>,
    ) -> Result<Vec<StoreAction>, StoreError> {
        match event {
            StoreEvent::LoadConversations => Ok(self.handle_load_conversations()),
            StoreEvent::OpenConversation { partner } => Ok(self.handle_open(partner)),
            StoreEvent::CloseConversation => Ok(self.handle_close()),
            StoreEvent::SendMessage { body } => self.handle_send(&body),
            StoreEvent::InputChanged { text } => Ok(self.handle_input_changed(&text)),
            StoreEvent::Connected => Ok(self.handle_connected()),
            StoreEvent::Disconnected => {
                self.connected = false;
                Ok(vec![])
            },
            StoreEvent::Inbound(inbound) => Ok(self.handle_inbound(inbound)),
            StoreEvent::ConversationsLoaded { generation, result } => {
                Ok(self.handle_conversations_loaded(generation, result))
            },
            StoreEvent::HistoryLoaded { partner_id, generation, result } => {
                Ok(self.handle_history_loaded(&partner_id, generation, result))
            },
            StoreEvent::Tick { now } => Ok(self.handle_tick(now)),
        }
    }

    // --- intents ---------------------------------------------------------

    fn handle_load_conversations(&mut self) -> Vec<StoreAction> {
        if self.phase == Phase::Idle {
            self.phase = Phase::LoadingList;
        }
        vec![self.start_list_fetch()]
    }

    fn handle_open(&mut self, partner: Counterparty) -> Vec<StoreAction> {
        let mut actions = self.close_active();

        self.history_generation += 1;

        // Prefer the summary's copy of the counterparty: the list fetch is
        // the richer source for profile fields.
        let known = self.summaries.iter_mut().find(|s| s.partner.id == partner.id);

        match known {
            Some(summary) => {
                let partner = summary.partner.clone();
                // Optimistic unread reset; the next authoritative list
                // fetch overwrites it either way.
                summary.unread_count = 0;

                self.active = Some(ActiveConversation::Existing { partner: partner.clone() });
                self.phase = Phase::OpeningConversation;

                self.emit_or_queue(
                    OutboundEvent::JoinConversation(ConversationRoom {
                        partner_id: partner.id.0.clone(),
                    }),
                    &mut actions,
                );
                self.emit_or_queue(
                    OutboundEvent::MarkConversationSeen(MarkConversationSeen {
                        partner_id: partner.id.0.clone(),
                    }),
                    &mut actions,
                );
                actions.push(StoreAction::FetchHistory {
                    partner_id: partner.id,
                    generation: self.history_generation,
                });
            },
            None => {
                // Draft mode: no summary, no history, no room until the
                // first outbound message is acknowledged.
                self.active = Some(ActiveConversation::Draft { partner });
                self.phase = Phase::ConversationReady;
            },
        }

        actions
    }

    fn handle_close(&mut self) -> Vec<StoreAction> {
        let actions = self.close_active();
        if self.phase != Phase::Idle && self.phase != Phase::LoadingList {
            self.phase = Phase::ListReady;
        }
        actions
    }

    fn handle_send(&mut self, body: &str) -> Result<Vec<StoreAction>, StoreError> {
        let body = body.trim();
        if body.is_empty() {
            return Ok(vec![]);
        }
        if self.sending {
            tracing::debug!("send suppressed: previous send still in flight");
            return Ok(vec![]);
        }
        let Some(active) = &self.active else {
            return Err(StoreError::NoActiveConversation);
        };
        let partner_id = active.partner().id.clone();

        let mut actions = Vec::new();

        // Sending empties the compose box; stop the typing indicator now
        // rather than waiting for the idle window.
        if let Some(signal) = self.typing_out.close() {
            self.emit_typing(signal, &mut actions);
        }

        self.sending = true;
        let correlation = self.env.random_u64();
        self.thread.push(Message::shadow(body.to_owned(), correlation));

        let outcome = self.emit_or_queue(
            OutboundEvent::SendMessage(SendMessage {
                receiver_id: partner_id.0,
                content: body.to_owned(),
                kind: MessageKind::Text,
            }),
            &mut actions,
        );

        if matches!(outcome, EmitOutcome::Dropped) {
            // The intent never left; roll back the exact mutation.
            self.thread.retain(|m| m.correlation != Some(correlation));
            self.sending = false;
        }

        Ok(actions)
    }

    fn handle_input_changed(&mut self, text: &str) -> Vec<StoreAction> {
        let Some(active) = &self.active else {
            return vec![];
        };
        let partner_id = active.partner().id.clone();
        let now = self.env.now();

        let mut actions = Vec::new();
        for signal in self.typing_out.input_changed(&partner_id, text.trim().is_empty(), now) {
            self.emit_typing(signal, &mut actions);
        }
        actions
    }

    // --- transport lifecycle ---------------------------------------------

    fn handle_connected(&mut self) -> Vec<StoreAction> {
        self.connected = true;
        let mut actions = Vec::new();

        // Reconnects silently drop gateway subscriptions: rejoin the open
        // room and refresh the presence snapshot, exactly once each.
        if let Some(active) = &self.active
            && !active.is_draft()
        {
            actions.push(StoreAction::Emit(OutboundEvent::JoinConversation(ConversationRoom {
                partner_id: active.partner().id.0.clone(),
            })));
        }

        let mut user_ids: Vec<String> =
            self.summaries.iter().map(|s| s.partner.id.0.clone()).collect();
        if let Some(active) = &self.active
            && !user_ids.contains(&active.partner().id.0)
        {
            user_ids.push(active.partner().id.0.clone());
        }
        actions.push(StoreAction::Emit(OutboundEvent::GetOnlineStatus(OnlineStatusQuery {
            user_ids,
        })));

        // Flush intents raised while offline, in order.
        while let Some(event) = self.outbound_queue.pop_front() {
            actions.push(StoreAction::Emit(event));
        }

        actions
    }

    // --- gateway events --------------------------------------------------

    fn handle_inbound(&mut self, inbound: InboundEvent) -> Vec<StoreAction> {
        match inbound {
            InboundEvent::OnlineUsers(users) => {
                self.presence.replace(users.into_iter().map(|u| UserId(u.id)));
                vec![]
            },
            InboundEvent::UserOnline(delta) => {
                self.presence.set_online(UserId(delta.user_id));
                vec![]
            },
            InboundEvent::UserOffline(delta) => {
                self.presence.set_offline(&UserId(delta.user_id));
                vec![]
            },
            InboundEvent::OnlineStatuses(map) => {
                self.presence.apply_statuses(statuses_from_wire(map));
                vec![]
            },
            InboundEvent::NewMessage(record) => self.handle_new_message(record),
            InboundEvent::MessageSent(record) => self.handle_message_sent(record),
            InboundEvent::MessageErrored(err) => {
                self.sending = false;
                if let Some(pos) = self.thread.iter().rposition(Message::is_shadow) {
                    self.thread.remove(pos);
                }
                vec![StoreAction::Notice(Notice::SendFailed { reason: err.error })]
            },
            InboundEvent::MessageSeen(ack) => {
                let id = MessageId(ack.message_id);
                if let Some(message) = self.thread.iter_mut().find(|m| m.id.as_ref() == Some(&id)) {
                    message.delivered = true;
                    message.seen = true;
                }
                vec![]
            },
            InboundEvent::ConversationSeen(ack) => {
                if self.active_partner_is(&ack.partner_id) {
                    for message in &mut self.thread {
                        if message.direction == crate::models::Direction::Outbound {
                            message.delivered = true;
                            message.seen = true;
                        }
                    }
                }
                vec![]
            },
            InboundEvent::UserTyping(notice) => {
                let now = self.env.now();
                self.typing_in.refresh(UserId(notice.user_id), now);
                vec![]
            },
            InboundEvent::UserStoppedTyping(notice) => {
                self.typing_in.clear(&UserId(notice.user_id));
                vec![]
            },
        }
    }

    fn handle_new_message(&mut self, record: MessageRecord) -> Vec<StoreAction> {
        let mut actions = Vec::new();
        let sender = record.sender_id.clone();

        if self.active_partner_is(&sender) {
            let message = Message::from_record(record, &self.self_id);
            self.merge_message(message);
            // Reading happens implicitly while the conversation is open.
            self.emit_or_queue(
                OutboundEvent::MarkConversationSeen(MarkConversationSeen { partner_id: sender }),
                &mut actions,
            );
        }

        // Refresh summaries regardless of the target conversation so
        // previews and unread counts stay current.
        actions.push(self.start_list_fetch());
        actions
    }

    fn handle_message_sent(&mut self, record: MessageRecord) -> Vec<StoreAction> {
        // Redelivered ack for an already-confirmed message: widen its flags
        // and touch neither the latch nor any newer in-flight shadow.
        let id = MessageId(record.id.clone());
        if self.thread.iter().any(|m| m.id.as_ref() == Some(&id)) {
            self.merge_message(Message::from_record(record, &self.self_id));
            return vec![];
        }

        self.sending = false;

        let mut actions = Vec::new();
        let partner_id = record.receiver_id.clone();

        if !self.active_partner_is(&partner_id) {
            // Acknowledged after the conversation was closed; the history
            // fetch will pick the message up when it is reopened.
            tracing::debug!(partner = %partner_id, "send ack for a closed conversation");
            return actions;
        }

        // Reconcile the ack against the oldest in-flight shadow. The
        // gateway does not echo a correlation id, but the latch guarantees
        // at most one shadow exists.
        if let Some(pos) = self.thread.iter().position(Message::is_shadow) {
            let confirmed = Message::from_record(record.clone(), &self.self_id);
            self.thread.remove(pos);
            self.merge_message(confirmed);
        } else {
            self.merge_message(Message::from_record(record.clone(), &self.self_id));
        }

        // Keep the list preview current without waiting for the refetch.
        if let Some(summary) = self.summaries.iter_mut().find(|s| s.partner.id.0 == partner_id) {
            summary.last_message = record.content;
            summary.last_message_at = record.created_at;
        }

        // First ack promotes a draft: the conversation now exists on the
        // server, so join its room and locate the new summary.
        if let Some(ActiveConversation::Draft { partner }) = self.active.clone() {
            self.active = Some(ActiveConversation::Existing { partner: partner.clone() });
            self.emit_or_queue(
                OutboundEvent::JoinConversation(ConversationRoom { partner_id: partner.id.0 }),
                &mut actions,
            );
            actions.push(self.start_list_fetch());
        }

        actions
    }

    // --- fetch completions -----------------------------------------------

    fn handle_conversations_loaded(
        &mut self,
        generation: u64,
        result: Result<Vec<parlor_proto::records::ConversationRecord>, FetchFailure>,
    ) -> Vec<StoreAction> {
        if generation != self.list_generation {
            tracing::debug!(generation, current = self.list_generation, "stale list fetch dropped");
            return vec![];
        }

        match result {
            Ok(records) => {
                // Full replacement: the fetch is authoritative and any
                // optimistic edit in the meantime yields to it.
                self.summaries = records.into_iter().map(ConversationSummary::from).collect();
                if self.phase == Phase::LoadingList {
                    self.phase = Phase::ListReady;
                }

                // A draft whose summary has appeared is promoted in place.
                // The conversation exists on the server now, so join its
                // room just as the ack-path promotion does.
                let mut actions = Vec::new();
                if let Some(ActiveConversation::Draft { partner }) = self.active.clone()
                    && self.summaries.iter().any(|s| s.partner.id == partner.id)
                {
                    self.active = Some(ActiveConversation::Existing { partner: partner.clone() });
                    self.emit_or_queue(
                        OutboundEvent::JoinConversation(ConversationRoom {
                            partner_id: partner.id.0,
                        }),
                        &mut actions,
                    );
                }
                actions
            },
            Err(failure) => {
                if self.phase == Phase::LoadingList {
                    self.phase = Phase::ListReady;
                }
                vec![StoreAction::Notice(Notice::LoadFailed { reason: failure.reason })]
            },
        }
    }

    fn handle_history_loaded(
        &mut self,
        partner_id: &UserId,
        generation: u64,
        result: Result<Vec<MessageRecord>, FetchFailure>,
    ) -> Vec<StoreAction> {
        // Both guards matter: the generation catches close/reopen races and
        // the partner check is a belt against a mis-tagged completion.
        if generation != self.history_generation || !self.active_partner_is(&partner_id.0) {
            tracing::debug!(partner = %partner_id, "stale history fetch dropped");
            return vec![];
        }

        match result {
            Ok(records) => {
                for record in records {
                    let message = Message::from_record(record, &self.self_id);
                    self.merge_message(message);
                }
                self.phase = Phase::ConversationReady;
                vec![]
            },
            Err(failure) => {
                // Open the thread empty rather than freezing the view; the
                // user can close and reopen to retry.
                self.phase = Phase::ConversationReady;
                vec![StoreAction::Notice(Notice::HistoryFailed { reason: failure.reason })]
            },
        }
    }

    // --- time ------------------------------------------------------------

    fn handle_tick(&mut self, now: E::Instant) -> Vec<StoreAction> {
        let mut actions = Vec::new();
        if let Some(signal) = self.typing_out.tick(now) {
            self.emit_typing(signal, &mut actions);
        }
        self.typing_in.sweep(now);
        actions
    }

    // --- helpers ---------------------------------------------------------

    /// Tear down the open conversation: stop typing, leave the room, drop
    /// the thread, and invalidate any in-flight history fetch.
    fn close_active(&mut self) -> Vec<StoreAction> {
        let mut actions = Vec::new();

        if let Some(signal) = self.typing_out.close() {
            self.emit_typing(signal, &mut actions);
        }
        self.typing_in.clear_all();

        if let Some(active) = self.active.take() {
            if !active.is_draft() {
                self.emit_or_queue(
                    OutboundEvent::LeaveConversation(ConversationRoom {
                        partner_id: active.partner().id.0.clone(),
                    }),
                    &mut actions,
                );
            }
            self.thread.clear();
            self.history_generation += 1;
        }

        actions
    }

    /// Insert a message keeping identity uniqueness and timestamp order.
    ///
    /// Shadows (no timestamp) sort after all confirmed messages. A
    /// duplicate identity only widens the delivered/seen flags.
    fn merge_message(&mut self, message: Message) {
        if let Some(id) = &message.id
            && let Some(existing) = self.thread.iter_mut().find(|m| m.id.as_ref() == Some(id))
        {
            existing.delivered |= message.delivered;
            existing.seen |= message.seen;
            return;
        }

        let key = message.timestamp_ms.unwrap_or(u64::MAX);
        let pos = self
            .thread
            .partition_point(|m| m.timestamp_ms.unwrap_or(u64::MAX) <= key);
        self.thread.insert(pos, message);
    }

    /// Route an outbound event through the connectivity gate.
    fn emit_or_queue(
        &mut self,
        event: OutboundEvent,
        actions: &mut Vec<StoreAction>,
    ) -> EmitOutcome {
        if self.connected {
            actions.push(StoreAction::Emit(event));
            EmitOutcome::Sent
        } else if self.outbound_queue.len() < self.queue_capacity {
            self.outbound_queue.push_back(event);
            EmitOutcome::Queued
        } else {
            tracing::warn!(capacity = self.queue_capacity, "outbound queue full, intent dropped");
            actions.push(StoreAction::Notice(Notice::QueueFull { capacity: self.queue_capacity }));
            EmitOutcome::Dropped
        }
    }

    /// Typing signals are ephemeral: emit when connected, drop otherwise.
    fn emit_typing(&mut self, signal: TypingSignal, actions: &mut Vec<StoreAction>) {
        if !self.connected {
            return;
        }
        let event = match signal {
            TypingSignal::Start(partner) => {
                OutboundEvent::TypingStart(TypingTarget { receiver_id: partner.0 })
            },
            TypingSignal::Stop(partner) => {
                OutboundEvent::TypingStop(TypingTarget { receiver_id: partner.0 })
            },
        };
        actions.push(StoreAction::Emit(event));
    }

    fn start_list_fetch(&mut self) -> StoreAction {
        self.list_generation += 1;
        StoreAction::FetchConversations { generation: self.list_generation }
    }

    fn active_partner_is(&self, user_id: &str) -> bool {
        self.active.as_ref().is_some_and(|a| a.partner().id.0 == user_id)
    }

    // --- views -----------------------------------------------------------

    /// This client's own user id.
    pub fn self_id(&self) -> &UserId {
        &self.self_id
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the store believes the transport is connected.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Whether a send is in flight.
    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Conversation summaries in list order.
    pub fn summaries(&self) -> &[ConversationSummary] {
        &self.summaries
    }

    /// The open conversation, if any.
    pub fn active(&self) -> Option<&ActiveConversation> {
        self.active.as_ref()
    }

    /// Messages of the open conversation.
    pub fn thread(&self) -> &[Message] {
        &self.thread
    }

    /// Presence overlay for rendering.
    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    /// Whether the open conversation's counterparty is typing.
    pub fn partner_typing(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| self.typing_in.is_typing(&a.partner().id))
    }

    /// Number of intents waiting in the disconnected queue.
    pub fn queued_len(&self) -> usize {
        self.outbound_queue.len()
    }
}
