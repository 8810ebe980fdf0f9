//! Integration tests for App and Bridge behavior.
//!
//! # Oracle Pattern
//!
//! Tests end with oracle checks that verify:
//! - App state reflects the expected panel and compose state
//! - The store behind the bridge holds the expected conversation state
//! - The right gateway events and fetches leave the bridge

use std::time::Duration;

use parlor_app::{App, Bridge, FetchRequest, GatewayUpdate, ViewAction};
use parlor_core::{ActiveConversation, Counterparty, UserId, env::Environment};
use parlor_proto::records::{ConversationRecord, MessageRecord, UserRecord};
use parlor_proto::{InboundEvent, OutboundEvent};

#[derive(Clone)]
struct TestEnv;

impl Environment for TestEnv {
    type Instant = std::time::Instant;

    fn now(&self) -> std::time::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        std::future::ready(())
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        for (i, byte) in buffer.iter_mut().enumerate() {
            *byte = i as u8;
        }
    }
}

fn user(id: &str) -> UserRecord {
    UserRecord {
        id: id.to_owned(),
        name: format!("User {id}"),
        username: format!("user_{id}"),
        avatar: None,
    }
}

fn partner(id: &str) -> Counterparty {
    user(id).into()
}

fn conversation(partner_id: &str, unread: u32) -> ConversationRecord {
    ConversationRecord {
        partner: user(partner_id),
        last_message: "latest".to_owned(),
        last_message_at: 1_700_000_000_000,
        unread_count: unread,
    }
}

fn message(id: &str, sender: &str, receiver: &str, created_at: u64) -> MessageRecord {
    MessageRecord {
        id: id.to_owned(),
        sender_id: sender.to_owned(),
        receiver_id: receiver.to_owned(),
        content: format!("body of {id}"),
        delivered: true,
        seen: false,
        created_at,
    }
}

/// Create an App plus a Bridge whose store is connected to the gateway.
fn connected_pair() -> (App, Bridge<TestEnv>) {
    let app = App::new();
    let mut bridge = Bridge::new(TestEnv, UserId::from("u1"));
    let _ = bridge.handle_gateway(GatewayUpdate::Up);
    let _ = bridge.take_outgoing();
    (app, bridge)
}

/// Process actions from App through Bridge and update App state.
fn process_actions(
    app: &mut App,
    bridge: &mut Bridge<TestEnv>,
    actions: Vec<ViewAction>,
) -> Vec<OutboundEvent> {
    for action in actions {
        match action {
            ViewAction::Refresh
            | ViewAction::Open { .. }
            | ViewAction::Close
            | ViewAction::Send { .. }
            | ViewAction::Input { .. } => {
                let events = bridge.process_view_action(action);
                for event in events {
                    app.handle(event);
                }
            },
            ViewAction::Render | ViewAction::Quit => {},
        }
    }

    bridge.take_outgoing()
}

/// Complete the pending conversation-list fetch with the given records.
fn complete_list_fetch(
    app: &mut App,
    bridge: &mut Bridge<TestEnv>,
    records: Vec<ConversationRecord>,
) {
    let fetches = bridge.take_fetches();
    let generation = fetches
        .iter()
        .find_map(|f| match f {
            FetchRequest::Conversations { generation } => Some(*generation),
            FetchRequest::History { .. } => None,
        })
        .expect("a list fetch should be pending");

    let events = bridge.complete_conversations(generation, Ok(records));
    for event in events {
        app.handle(event);
    }
}

/// Complete the pending history fetch with the given records.
fn complete_history_fetch(
    app: &mut App,
    bridge: &mut Bridge<TestEnv>,
    records: Vec<MessageRecord>,
) {
    let fetches = bridge.take_fetches();
    let (partner_id, generation) = fetches
        .iter()
        .find_map(|f| match f {
            FetchRequest::History { partner_id, generation } => {
                Some((partner_id.clone(), *generation))
            },
            FetchRequest::Conversations { .. } => None,
        })
        .expect("a history fetch should be pending");

    let events = bridge.complete_history(partner_id, generation, Ok(records));
    for event in events {
        app.handle(event);
    }
}

/// Extract events with a specific wire name.
fn events_by_name(events: &[OutboundEvent], name: &str) -> usize {
    events.iter().filter(|e| e.name() == name).count()
}

#[test]
fn selecting_conversation_joins_and_marks_seen() {
    let (mut app, mut bridge) = connected_pair();

    let actions = app.open_panel();
    process_actions(&mut app, &mut bridge, actions);
    complete_list_fetch(&mut app, &mut bridge, vec![conversation("u2", 3)]);

    let actions = app.select_conversation(partner("u2"));
    let outgoing = process_actions(&mut app, &mut bridge, actions);

    // Oracle: join and mark-seen go out, history fetch is requested
    assert_eq!(events_by_name(&outgoing, "join_conversation"), 1, "Should join the room");
    assert_eq!(events_by_name(&outgoing, "mark_conversation_seen"), 1, "Should mark seen");
    assert!(
        matches!(bridge.take_fetches().as_slice(), [FetchRequest::History { partner_id, .. }] if partner_id.as_str() == "u2")
    );

    // Oracle: unread badge cleared optimistically
    assert_eq!(bridge.store().summaries()[0].unread_count, 0);
}

#[test]
fn deep_link_waits_for_list_then_opens() {
    let (mut app, mut bridge) = connected_pair();

    let actions = app.deep_link(partner("u2"));
    process_actions(&mut app, &mut bridge, actions);

    // Not open yet: the list has not loaded
    assert!(bridge.store().active().is_none(), "Deep link must wait for the list");
    assert!(app.panel_open());

    complete_list_fetch(&mut app, &mut bridge, vec![conversation("u2", 1)]);
    let actions = app.resolve_deep_link();
    let outgoing = process_actions(&mut app, &mut bridge, actions);

    // Oracle: the existing conversation opened, not a draft
    assert!(
        matches!(bridge.store().active(), Some(ActiveConversation::Existing { partner }) if partner.id.as_str() == "u2")
    );
    assert_eq!(events_by_name(&outgoing, "join_conversation"), 1);

    // Oracle: the link is spent
    assert!(app.resolve_deep_link().is_empty(), "Deep link should apply only once");
}

#[test]
fn deep_link_to_unknown_partner_opens_draft() {
    let (mut app, mut bridge) = connected_pair();

    let actions = app.deep_link(partner("u9"));
    process_actions(&mut app, &mut bridge, actions);
    complete_list_fetch(&mut app, &mut bridge, vec![conversation("u2", 0)]);

    let actions = app.resolve_deep_link();
    let outgoing = process_actions(&mut app, &mut bridge, actions);

    assert!(matches!(bridge.store().active(), Some(ActiveConversation::Draft { .. })));
    assert_eq!(events_by_name(&outgoing, "join_conversation"), 0, "Drafts have no room yet");
}

#[test]
fn submit_flow_sends_and_clears_compose() {
    let (mut app, mut bridge) = connected_pair();

    let actions = app.open_panel();
    process_actions(&mut app, &mut bridge, actions);
    complete_list_fetch(&mut app, &mut bridge, vec![conversation("u2", 0)]);
    let actions = app.select_conversation(partner("u2"));
    process_actions(&mut app, &mut bridge, actions);
    complete_history_fetch(&mut app, &mut bridge, vec![message("m1", "u2", "u1", 100)]);

    let _ = app.compose_changed("hello there");
    let actions = app.submit_compose();
    let outgoing = process_actions(&mut app, &mut bridge, actions);

    // Oracle: message went out, compose is empty, shadow is in the thread
    assert_eq!(events_by_name(&outgoing, "send_message"), 1, "Should send the message");
    assert_eq!(app.compose(), "");
    assert!(bridge.store().thread().last().is_some_and(parlor_core::Message::is_shadow));
}

#[test]
fn send_rejection_surfaces_in_status_line() {
    let (mut app, mut bridge) = connected_pair();

    let actions = app.open_panel();
    process_actions(&mut app, &mut bridge, actions);
    complete_list_fetch(&mut app, &mut bridge, vec![conversation("u2", 0)]);
    let actions = app.select_conversation(partner("u2"));
    process_actions(&mut app, &mut bridge, actions);
    complete_history_fetch(&mut app, &mut bridge, vec![]);

    let _ = app.compose_changed("hello");
    let actions = app.submit_compose();
    process_actions(&mut app, &mut bridge, actions);

    let events = bridge.handle_gateway(GatewayUpdate::Event(InboundEvent::MessageErrored(
        parlor_proto::payloads::inbound::MessageError { error: "blocked".to_owned() },
    )));
    for event in events {
        app.handle(event);
    }

    // Oracle: shadow rolled back, user told why
    assert!(bridge.store().thread().iter().all(|m| !m.is_shadow()));
    assert!(
        app.status_message().is_some_and(|m| m.contains("blocked")),
        "Status should carry the rejection: {:?}",
        app.status_message()
    );
}

#[test]
fn incoming_message_triggers_list_refresh() {
    let (mut app, mut bridge) = connected_pair();

    let actions = app.open_panel();
    process_actions(&mut app, &mut bridge, actions);
    complete_list_fetch(&mut app, &mut bridge, vec![conversation("u2", 0)]);

    let events = bridge.handle_gateway(GatewayUpdate::Event(InboundEvent::NewMessage(message(
        "m7", "u3", "u1", 900,
    ))));
    for event in events {
        app.handle(event);
    }

    // Oracle: a fresh list fetch is requested for the preview and badge
    assert!(
        bridge
            .take_fetches()
            .iter()
            .any(|f| matches!(f, FetchRequest::Conversations { .. })),
        "Unread counts come from a refetch"
    );
}

#[test]
fn closing_panel_leaves_the_room() {
    let (mut app, mut bridge) = connected_pair();

    let actions = app.open_panel();
    process_actions(&mut app, &mut bridge, actions);
    complete_list_fetch(&mut app, &mut bridge, vec![conversation("u2", 0)]);
    let actions = app.select_conversation(partner("u2"));
    process_actions(&mut app, &mut bridge, actions);

    let actions = app.close_panel();
    let outgoing = process_actions(&mut app, &mut bridge, actions);

    // Oracle: room left, nothing open, panel closed
    assert_eq!(events_by_name(&outgoing, "leave_conversation"), 1, "Should leave the room");
    assert!(bridge.store().active().is_none());
    assert!(!app.panel_open());
}

#[test]
fn reconnect_restores_subscriptions() {
    let (mut app, mut bridge) = connected_pair();

    let actions = app.open_panel();
    process_actions(&mut app, &mut bridge, actions);
    complete_list_fetch(&mut app, &mut bridge, vec![conversation("u2", 0)]);
    let actions = app.select_conversation(partner("u2"));
    process_actions(&mut app, &mut bridge, actions);

    let events = bridge.handle_gateway(GatewayUpdate::Down);
    for event in events {
        app.handle(event);
    }
    assert_eq!(app.status_message(), Some("Reconnecting..."));

    let events = bridge.handle_gateway(GatewayUpdate::Up);
    for event in events {
        app.handle(event);
    }
    let outgoing = bridge.take_outgoing();

    // Oracle: room rejoined and presence snapshot requested, banner gone
    assert_eq!(events_by_name(&outgoing, "join_conversation"), 1, "Should rejoin the open room");
    assert_eq!(events_by_name(&outgoing, "get_online_status"), 1, "Should refresh presence");
    assert_eq!(app.status_message(), None);
}
