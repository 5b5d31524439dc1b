use std::collections::HashMap;
use std::time::{Duration, Instant};

use uuid::Uuid;

/// Rate limit for outgoing typing pings, per channel.
///
/// An entry lives for one cool-down window. While it lives, further pings
/// for that channel are suppressed.
#[derive(Debug, Clone)]
pub struct TypingThrottle {
    cooldown: Duration,
    last_sent: HashMap<Uuid, Instant>,
}

impl TypingThrottle {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_sent: HashMap::new(),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Record a ping for `channel` unless one was sent within the window.
    ///
    /// Returns `true` when the caller should send the ping.
    pub fn try_begin(&mut self, channel: Uuid, now: Instant) -> bool {
        self.prune(now);

        if self.last_sent.contains_key(&channel) {
            return false;
        }

        self.last_sent.insert(channel, now);
        true
    }

    /// Drop entries whose window has elapsed.
    pub fn prune(&mut self, now: Instant) {
        let cooldown = self.cooldown;
        self.last_sent
            .retain(|_, sent| now.saturating_duration_since(*sent) < cooldown);
    }

    pub fn active(&self) -> usize {
        self.last_sent.len()
    }

    pub fn clear(&mut self) {
        self.last_sent.clear();
    }
}
