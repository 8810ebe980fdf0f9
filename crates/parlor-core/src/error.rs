//! Store error types.

use thiserror::Error;

/// Errors returned by [`crate::Store::handle`].
///
/// These indicate a misuse of the store by the view layer, not a runtime
/// failure; runtime failures surface as [`crate::Notice`] actions instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A send was dispatched with no conversation open.
    #[error("no conversation is open")]
    NoActiveConversation,
}
