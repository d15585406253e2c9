//! Reconnection policy for the admin status feed.
//!
//! The feed favors availability: snapshots are full state, so the default
//! policy reopens the socket after a fixed delay, forever. Making the policy
//! an explicit value keeps it testable and swappable without touching the
//! transport code.

use std::time::Duration;

use crate::defaults::RECONNECT_DELAY_MS;

/// Fixed-delay reconnection policy with an optional attempt cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    delay: Duration,
    max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_millis(RECONNECT_DELAY_MS))
    }
}

impl ReconnectPolicy {
    /// Reconnect after `delay`, with no attempt limit.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    /// Reconnect after `delay`, giving up once `max_attempts` connection
    /// attempts have completed. Used by tests and one-shot tooling.
    pub fn bounded(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: Some(max_attempts),
        }
    }

    /// Delay between attempts.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Delay to wait before the next attempt, given how many connection
    /// attempts have already completed. `None` means give up.
    pub fn next_delay(&self, completed_attempts: u32) -> Option<Duration> {
        match self.max_attempts {
            Some(max) if completed_attempts >= max => None,
            _ => Some(self.delay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_one_second_unbounded() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay(), Duration::from_millis(1000));
        // Still going strong after many attempts.
        assert_eq!(policy.next_delay(1_000_000), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn fixed_policy_never_gives_up() {
        let policy = ReconnectPolicy::fixed(Duration::from_millis(50));
        for attempts in [0, 1, 10, u32::MAX] {
            assert_eq!(policy.next_delay(attempts), Some(Duration::from_millis(50)));
        }
    }

    #[test]
    fn bounded_policy_stops_at_the_cap() {
        let policy = ReconnectPolicy::bounded(Duration::from_millis(10), 3);

        assert_eq!(policy.next_delay(1), Some(Duration::from_millis(10)));
        assert_eq!(policy.next_delay(2), Some(Duration::from_millis(10)));
        assert_eq!(policy.next_delay(3), None);
        assert_eq!(policy.next_delay(4), None);
    }
}
