//! Payload structs for named gateway events.
//!
//! Each event name maps to exactly one payload shape. Payloads are grouped
//! by direction: [`outbound`] for client-to-gateway intents, [`inbound`] for
//! gateway-to-client notifications.

pub mod inbound;
pub mod outbound;
