//! View side-effects and intents.
//!
//! This module defines the [`ViewAction`] enum, which represents
//! instructions produced by the [`crate::App`] state machine for the
//! runtime to execute.

use parlor_core::Counterparty;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Reload the conversation list.
    Refresh,

    /// Open a conversation with this counterparty.
    Open {
        /// Counterparty to open.
        partner: Counterparty,
    },

    /// Close the open conversation.
    Close,

    /// Send a message to the open conversation.
    Send {
        /// Message body.
        body: String,
    },

    /// The compose input changed.
    Input {
        /// Current input text.
        text: String,
    },
}
