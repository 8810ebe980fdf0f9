//! Production Environment implementation using system time and RNG.
//!
//! `SystemEnv` backs the store with real resources: `std::time::Instant`
//! for the debounce and expiry clocks, tokio for async sleep, and the OS
//! RNG (getrandom) for send correlation ids.

use std::time::Duration;

use parlor_core::env::Environment;

/// Production environment using system time and OS randomness.
///
/// # Panics
///
/// Panics if the OS RNG fails. RNG failure indicates OS-level breakage and
/// there is no sensible fallback for correlation ids.
#[derive(Clone, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - correlation ids need entropy");
    }
}
