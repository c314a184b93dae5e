//! Antiflood detection.
//!
//! Tracks recent message timestamps per (group, user) and reports when a
//! sender exceeds the group's configured burst.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::database::Group;

type FloodKey = (String, String); // (group_id, user_id)

/// In-memory flood tracker (lock-free map, per-key windows).
#[derive(Clone, Default)]
pub struct FloodTracker {
    data: Arc<DashMap<FloodKey, Vec<Instant>>>,
}

impl FloodTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message and check whether the sender is flooding.
    ///
    /// Disabled antiflood or a group-admin sender short-circuits to false
    /// without touching any state. On detection the sender's window is
    /// cleared so the same burst cannot immediately re-trigger.
    pub fn is_flood(&self, group: &Group, user_id: &str, is_group_admin: bool) -> bool {
        self.check_at(Instant::now(), group, user_id, is_group_admin)
    }

    fn check_at(&self, now: Instant, group: &Group, user_id: &str, is_group_admin: bool) -> bool {
        if !group.antiflood.status || is_group_admin {
            return false;
        }

        let window = Duration::from_secs(group.antiflood.interval_seconds as u64);
        let key = (group.group_id.clone(), user_id.to_string());

        let mut times = self.data.entry(key).or_default();
        times.retain(|&t| now.duration_since(t) < window);
        times.push(now);

        if times.len() >= group.antiflood.max_messages as usize {
            debug!(
                "Flood detected for {} in {} ({} msgs / {}s)",
                user_id, group.group_id, group.antiflood.max_messages, group.antiflood.interval_seconds
            );
            times.clear();
            return true;
        }

        false
    }

    /// Drop all tracked state for a user in a group.
    pub fn reset_user(&self, group_id: &str, user_id: &str) {
        self.data
            .remove(&(group_id.to_string(), user_id.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(max_messages: u32, interval_seconds: u32) -> Group {
        let mut g = Group::new("123@g.us");
        g.antiflood.status = true;
        g.antiflood.max_messages = max_messages;
        g.antiflood.interval_seconds = interval_seconds;
        g
    }

    const USER: &str = "5511999999999@s.whatsapp.net";

    #[test]
    fn test_disabled_never_detects_or_tracks() {
        let tracker = FloodTracker::new();
        let mut g = group(2, 10);
        g.antiflood.status = false;

        let now = Instant::now();
        for _ in 0..10 {
            assert!(!tracker.check_at(now, &g, USER, false));
        }
        assert!(tracker.data.is_empty());
    }

    #[test]
    fn test_group_admin_is_exempt() {
        let tracker = FloodTracker::new();
        let g = group(2, 10);

        let now = Instant::now();
        for _ in 0..10 {
            assert!(!tracker.check_at(now, &g, USER, true));
        }
        assert!(tracker.data.is_empty());
    }

    #[test]
    fn test_burst_detects_exactly_once_then_window_resets() {
        let tracker = FloodTracker::new();
        let g = group(5, 10);
        let now = Instant::now();

        for i in 0..4 {
            assert!(!tracker.check_at(now + Duration::from_millis(i), &g, USER, false));
        }
        // 5th message inside the window trips the detector
        assert!(tracker.check_at(now + Duration::from_millis(4), &g, USER, false));

        // window was cleared: the next 4 messages pass again
        for i in 5..9 {
            assert!(!tracker.check_at(now + Duration::from_millis(i), &g, USER, false));
        }
    }

    #[test]
    fn test_slow_sender_never_detects() {
        let tracker = FloodTracker::new();
        let g = group(3, 2);
        let now = Instant::now();

        // one message every 3 seconds, window is 2 seconds
        for i in 0..10u64 {
            assert!(!tracker.check_at(now + Duration::from_secs(i * 3), &g, USER, false));
        }
    }

    #[test]
    fn test_windows_are_per_user() {
        let tracker = FloodTracker::new();
        let g = group(3, 10);
        let now = Instant::now();

        assert!(!tracker.check_at(now, &g, "a@s.whatsapp.net", false));
        assert!(!tracker.check_at(now, &g, "a@s.whatsapp.net", false));
        assert!(!tracker.check_at(now, &g, "b@s.whatsapp.net", false));
        // third message from "a" trips; "b" only has one
        assert!(tracker.check_at(now, &g, "a@s.whatsapp.net", false));
    }

    #[test]
    fn test_reset_user_clears_state() {
        let tracker = FloodTracker::new();
        let g = group(3, 10);
        let now = Instant::now();

        tracker.check_at(now, &g, USER, false);
        tracker.check_at(now, &g, USER, false);
        tracker.reset_user(&g.group_id, USER);
        assert!(!tracker.check_at(now, &g, USER, false));
        assert!(!tracker.check_at(now, &g, USER, false));
    }
}
