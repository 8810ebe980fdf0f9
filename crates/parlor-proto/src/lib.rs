//! Wire protocol for the Parlor messaging gateway.
//!
//! The gateway speaks a named-event protocol over a persistent socket: every
//! frame is a JSON envelope `{"event": <name>, "data": <payload>}`. Event
//! names identify the payload shape, much like an opcode identifies a binary
//! payload. This crate defines both directions of the event table, the wire
//! records shared with the REST collaborators, and the envelope codec.
//!
//! # Components
//!
//! - [`OutboundEvent`]: events the client emits to the gateway
//! - [`InboundEvent`]: events the gateway delivers to the client
//! - [`records`]: user/message/conversation records shared by both the
//!   gateway and the REST messaging API
//!
//! The codec is strict on structure and lenient on extras: unknown fields
//! inside a known payload are ignored (the gateway adds fields over time),
//! but an unknown event name is a typed error so callers can log and skip.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod errors;
mod events;
pub mod payloads;
pub mod records;

pub use errors::{ProtocolError, Result};
pub use events::{InboundEvent, OutboundEvent};
