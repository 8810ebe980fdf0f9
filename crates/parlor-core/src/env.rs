//! Environment abstraction for deterministic testing.
//!
//! Decouples store logic from system resources (time, randomness). The
//! debouncer windows, typing-indicator expiry, and send correlation ids all
//! flow through this trait, so tests can drive virtual time and fixed
//! entropy while production uses the system clock and OS RNG.

use std::{ops::Add, time::Duration};

/// Abstract environment providing time and randomness.
///
/// # Invariants
///
/// Implementations MUST guarantee that `now()` never goes backwards within
/// a single execution context.
pub trait Environment: Clone + Send + Sync + 'static {
    /// The specific instant type used by this environment.
    ///
    /// Production environments use `std::time::Instant`; tests use a
    /// virtual instant they can advance by hand.
    type Instant: Copy
        + Ord
        + Send
        + Sync
        + std::ops::Sub<Output = Duration>
        + Add<Duration, Output = Self::Instant>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// This is the ONLY async method in the trait, and it should only be
    /// used by driver code (not store logic).
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    ///
    /// Used for correlation ids tagging optimistic sends.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }
}
