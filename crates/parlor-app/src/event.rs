//! View input events.
//!
//! This module defines [`ViewEvent`], the notifications that drive the
//! [`crate::App`] state machine from below: connectivity changes, store
//! updates, and user-visible notices. User interactions enter through the
//! App's intent methods instead, translated by the platform driver.

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// Periodic tick.
    Tick,

    /// Viewport resize (columns, rows).
    Resize(u16, u16),

    /// The gateway socket came up.
    ConnectionUp,

    /// The gateway socket went down; reconnection is in progress.
    ConnectionDown,

    /// Store state changed; the view should re-render.
    StoreUpdated,

    /// A user-visible notice was raised.
    Notice {
        /// Notice text ready for display.
        message: String,
    },
}
