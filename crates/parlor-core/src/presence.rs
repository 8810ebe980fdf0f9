//! Online-presence cache.
//!
//! The gateway is the source of truth for presence; this tracker is a cache
//! refreshed by a full snapshot on (re)connect and incrementally thereafter.
//! Duplicate deltas are expected and must be no-ops.

use std::collections::{HashMap, HashSet};

use crate::models::UserId;

/// Set of counterparty identities currently connected to the gateway.
#[derive(Debug, Clone, Default)]
pub struct PresenceTracker {
    online: HashSet<UserId>,
}

impl PresenceTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire set from an `online_users` snapshot.
    pub fn replace(&mut self, users: impl IntoIterator<Item = UserId>) {
        self.online = users.into_iter().collect();
    }

    /// Mark a user online. Idempotent: returns false if already present.
    pub fn set_online(&mut self, user: UserId) -> bool {
        self.online.insert(user)
    }

    /// Mark a user offline. Idempotent: returns false if already absent.
    pub fn set_offline(&mut self, user: &UserId) -> bool {
        self.online.remove(user)
    }

    /// Merge an `online_statuses` answer map.
    pub fn apply_statuses(&mut self, statuses: impl IntoIterator<Item = (UserId, bool)>) {
        for (user, online) in statuses {
            if online {
                self.online.insert(user);
            } else {
                self.online.remove(&user);
            }
        }
    }

    /// Whether a user currently holds an open gateway connection.
    pub fn is_online(&self, user: &UserId) -> bool {
        self.online.contains(user)
    }

    /// The current online set.
    pub fn online_set(&self) -> &HashSet<UserId> {
        &self.online
    }
}

/// Convert a wire status map into tracker input.
pub(crate) fn statuses_from_wire(map: HashMap<String, bool>) -> Vec<(UserId, bool)> {
    map.into_iter().map(|(id, online)| (UserId(id), online)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_then_deltas() {
        let mut tracker = PresenceTracker::new();
        tracker.replace([UserId::from("u1")]);

        assert!(tracker.set_offline(&UserId::from("u1")));
        assert!(tracker.set_online(UserId::from("u1")));
        assert!(tracker.is_online(&UserId::from("u1")));
        assert_eq!(tracker.online_set().len(), 1);

        // Redundant delta is a no-op
        assert!(!tracker.set_online(UserId::from("u1")));
        assert_eq!(tracker.online_set().len(), 1);
    }

    #[test]
    fn snapshot_replaces_not_merges() {
        let mut tracker = PresenceTracker::new();
        tracker.replace([UserId::from("u1"), UserId::from("u2")]);
        tracker.replace([UserId::from("u3")]);

        assert!(!tracker.is_online(&UserId::from("u1")));
        assert!(tracker.is_online(&UserId::from("u3")));
    }

    #[test]
    fn status_map_merges_both_ways() {
        let mut tracker = PresenceTracker::new();
        tracker.replace([UserId::from("u1")]);

        tracker.apply_statuses([(UserId::from("u1"), false), (UserId::from("u2"), true)]);
        assert!(!tracker.is_online(&UserId::from("u1")));
        assert!(tracker.is_online(&UserId::from("u2")));
    }
}
