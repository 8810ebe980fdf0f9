//! Property-based tests for store invariants.
//!
//! These drive the store with generated event sequences and check the
//! invariants that must hold regardless of ordering: thread ordering and
//! identity uniqueness, the outbound queue bound, and presence consistency
//! against a reference model.

use std::{collections::HashSet, time::Duration};

use proptest::prelude::*;

use parlor_core::{Counterparty, Store, StoreAction, StoreEvent, UserId, env::Environment};
use parlor_proto::InboundEvent;
use parlor_proto::payloads::inbound::PresenceDelta;
use parlor_proto::records::{ConversationRecord, MessageRecord, UserRecord};

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

fn record(id_num: u32, from_partner: bool, created_at: u64) -> MessageRecord {
    let (sender, receiver) = if from_partner { ("u2", "u1") } else { ("u1", "u2") };
    MessageRecord {
        id: format!("m{id_num}"),
        sender_id: sender.to_owned(),
        receiver_id: receiver.to_owned(),
        content: format!("body {id_num}"),
        delivered: false,
        seen: false,
        created_at,
    }
}

/// Store with the u2 conversation open and an empty thread.
fn open_store(connected: bool) -> Store<TestEnv> {
    let mut store = Store::new(TestEnv, UserId::from("u1"));
    if connected {
        store.handle(StoreEvent::Connected).unwrap();
    }

    let actions = store.handle(StoreEvent::LoadConversations).unwrap();
    let generation = actions
        .iter()
        .find_map(|a| match a {
            StoreAction::FetchConversations { generation } => Some(*generation),
            _ => None,
        })
        .unwrap();
    store
        .handle(StoreEvent::ConversationsLoaded {
            generation,
            result: Ok(vec![ConversationRecord {
                partner: user("u2"),
                last_message: String::new(),
                last_message_at: 0,
                unread_count: 0,
            }]),
        })
        .unwrap();

    let partner: Counterparty = user("u2").into();
    let actions = store.handle(StoreEvent::OpenConversation { partner }).unwrap();
    let generation = actions
        .iter()
        .find_map(|a| match a {
            StoreAction::FetchHistory { generation, .. } => Some(*generation),
            _ => None,
        })
        .unwrap();
    store
        .handle(StoreEvent::HistoryLoaded {
            partner_id: UserId::from("u2"),
            generation,
            result: Ok(vec![]),
        })
        .unwrap();

    store
}

proptest! {
    /// Delivering the same records in any order, with arbitrary duplicates,
    /// always yields a thread that is unique by identity and ordered by
    /// server timestamp.
    #[test]
    fn thread_stays_sorted_and_unique(
        deliveries in prop::collection::vec((0u32..16, any::<bool>(), 0u64..1_000), 0..48)
    ) {
        let mut store = open_store(true);

        for (id_num, from_partner, created_at) in deliveries {
            store
                .handle(StoreEvent::Inbound(InboundEvent::NewMessage(record(
                    id_num,
                    from_partner,
                    created_at,
                ))))
                .unwrap();
        }

        let ids: Vec<_> = store.thread().iter().filter_map(|m| m.id.clone()).collect();
        let unique: HashSet<_> = ids.iter().cloned().collect();
        prop_assert_eq!(ids.len(), unique.len(), "duplicate identity in thread");

        let timestamps: Vec<u64> =
            store.thread().iter().filter_map(|m| m.timestamp_ms).collect();
        prop_assert!(
            timestamps.windows(2).all(|w| w[0] <= w[1]),
            "thread out of order: {:?}",
            timestamps
        );
    }

    /// However many intents arrive while disconnected, the outbound queue
    /// never grows past its capacity.
    #[test]
    fn disconnected_queue_stays_bounded(ops in prop::collection::vec(0u8..3, 0..64)) {
        let mut store = Store::new(TestEnv, UserId::from("u1")).with_queue_capacity(4);

        let actions = store.handle(StoreEvent::LoadConversations).unwrap();
        let generation = actions
            .iter()
            .find_map(|a| match a {
                StoreAction::FetchConversations { generation } => Some(*generation),
                _ => None,
            })
            .unwrap();
        store
            .handle(StoreEvent::ConversationsLoaded {
                generation,
                result: Ok(vec![ConversationRecord {
                    partner: user("u2"),
                    last_message: String::new(),
                    last_message_at: 0,
                    unread_count: 0,
                }]),
            })
            .unwrap();

        for op in ops {
            let partner: Counterparty = user("u2").into();
            let _ = match op {
                0 => store.handle(StoreEvent::OpenConversation { partner }),
                1 => store.handle(StoreEvent::CloseConversation),
                _ => store.handle(StoreEvent::SendMessage { body: "hi".to_owned() }),
            };
            prop_assert!(store.queued_len() <= 4, "queue grew to {}", store.queued_len());
        }
    }

    /// The presence set always matches a reference model fed the same
    /// deltas, including redundant ones.
    #[test]
    fn presence_matches_reference_model(
        deltas in prop::collection::vec((0u8..8, any::<bool>()), 0..64)
    ) {
        let mut store = Store::new(TestEnv, UserId::from("u1"));
        let mut model: HashSet<String> = HashSet::new();

        for (user_num, online) in deltas {
            let id = format!("u{user_num}");
            let delta = PresenceDelta { user_id: id.clone() };
            if online {
                model.insert(id);
                store.handle(StoreEvent::Inbound(InboundEvent::UserOnline(delta))).unwrap();
            } else {
                model.remove(&id);
                store.handle(StoreEvent::Inbound(InboundEvent::UserOffline(delta))).unwrap();
            }
        }

        let tracked: HashSet<String> =
            store.presence().online_set().iter().map(|u| u.0.clone()).collect();
        prop_assert_eq!(tracked, model);
    }
}
