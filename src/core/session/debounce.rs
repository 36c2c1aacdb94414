use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::core::turn::FailureKind;

/// Rate limiter for failure notifications.
///
/// A failure of a given kind is reported if that kind has not been reported
/// yet, or if the cooldown has elapsed since it was last reported. Any
/// upstream success clears the record so the next failure is reported
/// immediately.
#[derive(Debug)]
pub struct ErrorDebouncer {
    cooldown: Duration,
    last_notified: HashMap<FailureKind, Instant>,
}

impl ErrorDebouncer {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_notified: HashMap::new(),
        }
    }

    /// Decide whether to notify the peer, recording the notification if so
    pub fn should_notify(&mut self, kind: FailureKind, now: Instant) -> bool {
        let notify = match self.last_notified.get(&kind) {
            None => true,
            Some(last) => now.saturating_duration_since(*last) >= self.cooldown,
        };
        if notify {
            self.last_notified.insert(kind, now);
        }
        notify
    }

    pub fn clear(&mut self) {
        self.last_notified.clear();
    }

    /// Forget the last notification of one kind
    pub fn clear_kind(&mut self, kind: FailureKind) {
        self.last_notified.remove(&kind);
    }

    #[cfg(test)]
    fn has_reported(&self, kind: FailureKind) -> bool {
        self.last_notified.contains_key(&kind)
    }
}
