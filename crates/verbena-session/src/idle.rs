//! Idle tracking for session eviction.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Tracks last-activity times for idle-based eviction.
///
/// Unlike a fixed-TTL cache, the maximum age is supplied at eviction time,
/// so callers can sweep with different thresholds.
#[derive(Debug, Default)]
pub struct IdleTracker {
    /// Last activity time for each session.
    activity: HashMap<String, Instant>,
}

impl IdleTracker {
    /// Create a new, empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record activity for a session (resets its idle clock).
    pub fn touch(&mut self, session_id: &str) {
        self.activity.insert(session_id.to_string(), Instant::now());
    }

    /// How long a session has been idle, if it is tracked.
    pub fn idle_for(&self, session_id: &str) -> Option<Duration> {
        self.activity.get(session_id).map(|t| t.elapsed())
    }

    /// Remove tracking for a session.
    pub fn remove(&mut self, session_id: &str) {
        self.activity.remove(session_id);
    }

    /// Remove all entries idle longer than `max_age` and return their IDs.
    pub fn drain_idle(&mut self, max_age: Duration) -> Vec<String> {
        let now = Instant::now();
        let expired: Vec<String> = self
            .activity
            .iter()
            .filter(|(_, last)| now.duration_since(**last) > max_age)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            self.activity.remove(id);
        }
        expired
    }

    /// Get the number of tracked sessions.
    pub fn len(&self) -> usize {
        self.activity.len()
    }

    /// Check if there are no tracked sessions.
    pub fn is_empty(&self) -> bool {
        self.activity.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_touch_and_idle_for() {
        let mut tracker = IdleTracker::new();
        assert!(tracker.idle_for("session-1").is_none());

        tracker.touch("session-1");
        assert!(tracker.idle_for("session-1").is_some());
    }

    #[test]
    fn test_drain_idle_only_removes_stale_entries() {
        let mut tracker = IdleTracker::new();
        tracker.touch("old");

        thread::sleep(Duration::from_millis(20));
        tracker.touch("fresh");

        let drained = tracker.drain_idle(Duration::from_millis(10));
        assert_eq!(drained, vec!["old".to_string()]);
        assert_eq!(tracker.len(), 1);
        assert!(tracker.idle_for("fresh").is_some());
    }

    #[test]
    fn test_touch_resets_idle_clock() {
        let mut tracker = IdleTracker::new();
        tracker.touch("session-1");

        thread::sleep(Duration::from_millis(15));
        tracker.touch("session-1");

        let drained = tracker.drain_idle(Duration::from_millis(10));
        assert!(drained.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut tracker = IdleTracker::new();
        tracker.touch("session-1");
        tracker.touch("session-2");

        tracker.remove("session-1");

        assert_eq!(tracker.len(), 1);
        assert!(tracker.idle_for("session-1").is_none());
    }
}
