//! Typing-signal debounce and indicator expiry.
//!
//! The sender side converts raw keystroke activity into `typing_start` /
//! `typing_stop` signals with a trailing idle timeout: every non-empty
//! keystroke signals start and re-arms the timer; the timer's expiry, an
//! emptied input, or a conversation switch signals stop. No timer survives
//! a conversation switch.
//!
//! The receiver side keeps the set of counterparties currently typing and
//! expires entries after twice the idle window, so a `typing_stop` lost in
//! transit cannot pin an indicator forever.

use std::{collections::HashMap, ops::Add, time::Duration};

use crate::models::UserId;

/// Idle window after the last keystroke before `typing_stop` fires.
pub const TYPING_IDLE_WINDOW: Duration = Duration::from_millis(2000);

/// Receiver-side indicator lifetime without a refresh (2x the idle window).
pub const TYPING_INDICATOR_TTL: Duration = Duration::from_millis(4000);

/// A typing signal destined for the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypingSignal {
    /// Counterparty should show the indicator.
    Start(UserId),
    /// Counterparty should clear the indicator.
    Stop(UserId),
}

#[derive(Debug, Clone)]
struct Armed<I> {
    partner: UserId,
    deadline: I,
}

/// Sender-side trailing-edge debouncer.
///
/// Generic over `I` (instant type) so tests can drive virtual time.
#[derive(Debug, Clone)]
pub struct TypingDebouncer<I> {
    idle_window: Duration,
    armed: Option<Armed<I>>,
}

impl<I> TypingDebouncer<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    /// Create a debouncer with the standard idle window.
    pub fn new() -> Self {
        Self::with_window(TYPING_IDLE_WINDOW)
    }

    /// Create a debouncer with a custom idle window.
    pub fn with_window(idle_window: Duration) -> Self {
        Self { idle_window, armed: None }
    }

    /// Record a keystroke in the input bound to `partner`.
    ///
    /// Non-empty input signals start (repeats are harmless no-ops on the
    /// server side) and re-arms the idle timer. Empty input signals stop
    /// immediately and disarms.
    pub fn input_changed(&mut self, partner: &UserId, empty: bool, now: I) -> Vec<TypingSignal> {
        if empty {
            return self.disarm().into_iter().collect();
        }

        let mut signals = Vec::new();

        // A partner switch without an intervening close must not leak the
        // old timer.
        if let Some(armed) = &self.armed
            && armed.partner != *partner
        {
            signals.push(TypingSignal::Stop(armed.partner.clone()));
        }

        signals.push(TypingSignal::Start(partner.clone()));
        self.armed = Some(Armed { partner: partner.clone(), deadline: now + self.idle_window });
        signals
    }

    /// Drive time forward; fires the trailing stop once the window elapses.
    pub fn tick(&mut self, now: I) -> Option<TypingSignal> {
        match &self.armed {
            Some(armed) if armed.deadline <= now => self.disarm(),
            _ => None,
        }
    }

    /// Conversation closed or message sent: stop immediately, cancel the
    /// pending timer.
    pub fn close(&mut self) -> Option<TypingSignal> {
        self.disarm()
    }

    fn disarm(&mut self) -> Option<TypingSignal> {
        self.armed.take().map(|armed| TypingSignal::Stop(armed.partner))
    }
}

impl<I> Default for TypingDebouncer<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver-side typing-indicator set with expiry.
#[derive(Debug, Clone)]
pub struct TypingIndicators<I> {
    ttl: Duration,
    deadlines: HashMap<UserId, I>,
}

impl<I> TypingIndicators<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    /// Create an indicator set with the standard TTL.
    pub fn new() -> Self {
        Self::with_ttl(TYPING_INDICATOR_TTL)
    }

    /// Create an indicator set with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl, deadlines: HashMap::new() }
    }

    /// A `user_typing` notice arrived: show the indicator, refresh its TTL.
    pub fn refresh(&mut self, user: UserId, now: I) {
        self.deadlines.insert(user, now + self.ttl);
    }

    /// A `user_stopped_typing` notice arrived.
    pub fn clear(&mut self, user: &UserId) {
        self.deadlines.remove(user);
    }

    /// Drop everything, e.g. when the conversation closes.
    pub fn clear_all(&mut self) {
        self.deadlines.clear();
    }

    /// Expire stale indicators. Returns true if any were removed.
    pub fn sweep(&mut self, now: I) -> bool {
        let before = self.deadlines.len();
        self.deadlines.retain(|_, deadline| *deadline > now);
        self.deadlines.len() != before
    }

    /// Whether the user is currently shown as typing.
    pub fn is_typing(&self, user: &UserId) -> bool {
        self.deadlines.contains_key(user)
    }
}

impl<I> Default for TypingIndicators<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    /// Millisecond counter standing in for a monotonic instant.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct Tick(u64);

    impl Add<Duration> for Tick {
        type Output = Tick;
        fn add(self, rhs: Duration) -> Tick {
            Tick(self.0 + rhs.as_millis() as u64)
        }
    }

    #[test]
    fn stop_fires_after_idle_window() {
        let mut debouncer = TypingDebouncer::with_window(2000 * MS);
        let partner = UserId::from("u2");

        let signals = debouncer.input_changed(&partner, false, Tick(0));
        assert_eq!(signals, vec![TypingSignal::Start(partner.clone())]);

        assert_eq!(debouncer.tick(Tick(1999)), None);
        assert_eq!(debouncer.tick(Tick(2000)), Some(TypingSignal::Stop(partner.clone())));

        // Timer is disarmed after firing
        assert_eq!(debouncer.tick(Tick(9000)), None);
    }

    #[test]
    fn keystroke_rearms_window() {
        let mut debouncer = TypingDebouncer::with_window(2000 * MS);
        let partner = UserId::from("u2");

        let _ = debouncer.input_changed(&partner, false, Tick(0));
        let _ = debouncer.input_changed(&partner, false, Tick(1500));

        assert_eq!(debouncer.tick(Tick(2000)), None);
        assert_eq!(debouncer.tick(Tick(3500)), Some(TypingSignal::Stop(partner)));
    }

    #[test]
    fn empty_input_stops_immediately() {
        let mut debouncer = TypingDebouncer::with_window(2000 * MS);
        let partner = UserId::from("u2");

        let _ = debouncer.input_changed(&partner, false, Tick(0));
        let signals = debouncer.input_changed(&partner, true, Tick(100));
        assert_eq!(signals, vec![TypingSignal::Stop(partner)]);
    }

    #[test]
    fn close_cancels_pending_timer() {
        let mut debouncer = TypingDebouncer::with_window(2000 * MS);
        let partner = UserId::from("u2");

        let _ = debouncer.input_changed(&partner, false, Tick(0));
        assert_eq!(debouncer.close(), Some(TypingSignal::Stop(partner)));
        assert_eq!(debouncer.tick(Tick(5000)), None);
    }

    #[test]
    fn partner_switch_stops_old_timer() {
        let mut debouncer = TypingDebouncer::with_window(2000 * MS);
        let old = UserId::from("u2");
        let new = UserId::from("u3");

        let _ = debouncer.input_changed(&old, false, Tick(0));
        let signals = debouncer.input_changed(&new, false, Tick(100));

        assert_eq!(signals, vec![
            TypingSignal::Stop(old),
            TypingSignal::Start(new),
        ]);
    }

    #[test]
    fn indicator_expires_without_refresh() {
        let mut indicators = TypingIndicators::with_ttl(4000 * MS);
        let user = UserId::from("u2");

        indicators.refresh(user.clone(), Tick(0));
        assert!(indicators.is_typing(&user));

        assert!(!indicators.sweep(Tick(3999)));
        assert!(indicators.is_typing(&user));

        assert!(indicators.sweep(Tick(4000)));
        assert!(!indicators.is_typing(&user));
    }

    #[test]
    fn refresh_extends_indicator_lifetime() {
        let mut indicators = TypingIndicators::with_ttl(4000 * MS);
        let user = UserId::from("u2");

        indicators.refresh(user.clone(), Tick(0));
        indicators.refresh(user.clone(), Tick(3000));

        assert!(!indicators.sweep(Tick(4000)));
        assert!(indicators.is_typing(&user));
    }
}
