//! Protocol error types.
//!
//! Strongly-typed errors for envelope parsing and payload decoding. We avoid
//! exposing `serde_json::Error` directly so errors stay `Clone + Eq` and can
//! be carried inside state-machine events.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding gateway envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The envelope itself was not valid JSON or lacked the `event` field.
    #[error("malformed envelope: {reason}")]
    MalformedEnvelope {
        /// Parser diagnostic.
        reason: String,
    },

    /// The event name is not part of the protocol.
    ///
    /// Unknown events are expected across version skew; callers should log
    /// and ignore rather than tear down the connection.
    #[error("unknown event: {name}")]
    UnknownEvent {
        /// Event name as received.
        name: String,
    },

    /// The payload did not match the shape required by the event name.
    #[error("invalid payload for {event}: {reason}")]
    InvalidPayload {
        /// Event name whose payload failed to decode.
        event: &'static str,
        /// Parser diagnostic.
        reason: String,
    },

    /// Serialization of an outbound event failed.
    ///
    /// This indicates a bug (our own types failing to serialize), not a
    /// peer problem, but we surface it rather than panic.
    #[error("failed to encode {event}: {reason}")]
    Encode {
        /// Event name being encoded.
        event: &'static str,
        /// Serializer diagnostic.
        reason: String,
    },
}
