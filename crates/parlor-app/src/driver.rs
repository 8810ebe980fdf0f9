//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the view runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, ops::Sub, time::Duration};

use parlor_proto::{InboundEvent, OutboundEvent};

use crate::{App, ViewAction, ViewFrame};

/// Gateway transport update, as the driver reports it to the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayUpdate {
    /// The socket came up.
    Up,
    /// The socket went down; the transport is redialing.
    Down,
    /// A decoded event arrived.
    Event(InboundEvent),
}

/// Abstracts I/O operations for the view runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic, so the same
/// orchestration code runs in production and in tests.
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in tests. Must match the
    /// store environment's instant type.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Poll for user input, translating it into App intents.
    ///
    /// Returns the resulting actions, or an empty vector when no input is
    /// ready. Must not block indefinitely.
    fn poll_input(
        &mut self,
        app: &mut App,
    ) -> impl Future<Output = Result<Vec<ViewAction>, Self::Error>> + Send;

    /// Send an event to the gateway.
    fn send_event(
        &mut self,
        event: OutboundEvent,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Poll for the next gateway update.
    ///
    /// Returns `None` when no update is pending. Must not block
    /// indefinitely.
    fn poll_gateway(&mut self) -> impl Future<Output = Option<GatewayUpdate>> + Send;

    /// Fetch the conversation list.
    fn fetch_conversations(
        &mut self,
    ) -> impl Future<
        Output = Result<Vec<parlor_proto::records::ConversationRecord>, parlor_core::FetchFailure>,
    > + Send;

    /// Fetch message history with a counterparty.
    fn fetch_history(
        &mut self,
        partner_id: &str,
    ) -> impl Future<
        Output = Result<Vec<parlor_proto::records::MessageRecord>, parlor_core::FetchFailure>,
    > + Send;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Render the assembled view frame.
    fn render(&mut self, frame: &ViewFrame<'_>) -> Result<(), Self::Error>;

    /// Stop the connection and clean up resources.
    fn stop(&mut self);
}
