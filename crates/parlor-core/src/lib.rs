//! Conversation synchronization core.
//!
//! Parlor's core is a sans-IO state machine that keeps a client's view of
//! its one-to-one conversations consistent across three concurrent sources
//! of truth: optimistic local mutation, REST fetch results, and
//! asynchronous gateway events.
//!
//! # Architecture
//!
//! The [`Store`] receives events ([`StoreEvent`]), processes them through
//! pure state machine logic, and returns actions ([`StoreAction`]) for the
//! caller to execute. It performs no I/O itself: emitting a gateway event,
//! running a REST fetch, and rendering are all caller concerns, so the full
//! synchronization behavior is testable without a network.
//!
//! # Components
//!
//! - [`Store`]: the single state machine owning summaries, the open thread,
//!   presence, and typing state
//! - [`PresenceTracker`]: online set maintained from snapshots and deltas
//! - [`TypingDebouncer`] / [`TypingIndicators`]: sender-side debounce and
//!   receiver-side expiry for typing signals
//! - [`env::Environment`]: time and randomness abstraction enabling
//!   deterministic tests

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
mod error;
mod event;
mod models;
mod presence;
mod store;
mod typing;

pub use error::StoreError;
pub use event::{FetchFailure, Notice, StoreAction, StoreEvent};
pub use models::{
    ActiveConversation, Counterparty, ConversationSummary, Direction, Message, MessageId, UserId,
};
pub use presence::PresenceTracker;
pub use store::{OUTBOUND_QUEUE_CAPACITY, Phase, Store};
pub use typing::{TypingDebouncer, TypingIndicators, TypingSignal};
