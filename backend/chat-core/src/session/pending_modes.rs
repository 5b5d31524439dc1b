use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use uuid::Uuid;

/// Mode snapshots that arrived before our own join of the channel.
///
/// The server reports a channel's modes to a joining member before it
/// confirms the join. A held snapshot is applied when the join lands, or
/// dropped once the settle window has passed.
#[derive(Debug, Clone)]
pub struct PendingModes {
    settle: Duration,
    held: HashMap<Uuid, (BTreeSet<String>, Instant)>,
}

impl PendingModes {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            held: HashMap::new(),
        }
    }

    pub fn settle(&self) -> Duration {
        self.settle
    }

    /// Hold `modes` for `channel`, replacing any earlier snapshot.
    pub fn hold(&mut self, channel: Uuid, modes: BTreeSet<String>, now: Instant) {
        self.prune(now);
        self.held.insert(channel, (modes, now));
    }

    /// The snapshot held for `channel`, if it is still inside the window.
    pub fn take(&mut self, channel: &Uuid, now: Instant) -> Option<BTreeSet<String>> {
        self.prune(now);
        self.held.remove(channel).map(|(modes, _)| modes)
    }

    pub fn prune(&mut self, now: Instant) {
        let settle = self.settle;
        self.held
            .retain(|_, (_, received)| now.saturating_duration_since(*received) <= settle);
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}
