//! I/O layer for Parlor clients.
//!
//! Two collaborators feed the synchronization core:
//!
//! - [`transport`]: the persistent gateway socket, with reconnection and
//!   fresh-token redial built into the connection task
//! - [`rest::MessagingApi`]: the HTTP endpoints serving the conversation
//!   list and per-conversation history
//!
//! Both authenticate through a shared [`CredentialProvider`]. Neither holds
//! any conversation state; decoded events and fetched records are handed to
//! the store, which owns all reconciliation.
//!
//! [`SystemEnv`] is the production environment for that store: system
//! clock, tokio sleep, OS RNG.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod credentials;
mod error;
pub mod rest;
mod system_env;
pub mod transport;

pub use credentials::{CredentialProvider, StaticToken};
pub use error::{ClientError, Result};
pub use system_env::SystemEnv;
pub use transport::{ConnectedGateway, GatewayConfig, GatewayNotification};
