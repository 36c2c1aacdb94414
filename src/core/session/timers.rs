//! Silence timing for a session.
//!
//! The utterance boundary is evaluated lazily: every silence chunk compares
//! the time since silence began against the boundary delay, so no task is
//! needed. The call-end timeout must fire even if the client stops sending,
//! so it is a spawned sleep posting [`TimerEvent::CallEndElapsed`] back to
//! the session loop. Every arm or cancel bumps a generation counter; an
//! event carrying an older generation is ignored.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::debug;

/// Events posted by session timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    CallEndElapsed { generation: u64 },
}

/// Start of the current silence run
#[derive(Debug, Default)]
pub struct SilenceTracker {
    started_at: Option<Instant>,
    /// The run outlasted the boundary delay without producing an utterance
    boundary_passed: bool,
}

impl SilenceTracker {
    pub fn start(&mut self, now: Instant) {
        self.started_at = Some(now);
        self.boundary_passed = false;
    }

    pub fn clear(&mut self) {
        self.started_at = None;
        self.boundary_passed = false;
    }

    pub fn mark_boundary_passed(&mut self) {
        if self.started_at.is_some() {
            self.boundary_passed = true;
        }
    }

    pub fn boundary_passed(&self) -> bool {
        self.boundary_passed
    }

    pub fn is_accumulating(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Silence duration so far, `None` when not accumulating
    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        self.started_at
            .map(|start| now.saturating_duration_since(start))
    }
}

/// Cancellable call-end timeout
#[derive(Debug)]
pub struct CallEndTimer {
    delay: Duration,
    generation: u64,
    handle: Option<AbortHandle>,
    events: mpsc::UnboundedSender<TimerEvent>,
}

impl CallEndTimer {
    pub fn new(delay: Duration, events: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            delay,
            generation: 0,
            handle: None,
            events,
        }
    }

    /// (Re)start the timeout, cancelling any previous one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(&mut self) -> u64 {
        self.cancel();
        let generation = self.generation;
        let delay = self.delay;
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(TimerEvent::CallEndElapsed { generation });
        });
        self.handle = Some(task.abort_handle());
        debug!(generation, delay_ms = delay.as_millis() as u64, "Call-end timer armed");
        generation
    }

    /// Stop the timeout; an event already in flight becomes stale
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Accept an elapsed event. Returns `false` for stale generations.
    pub fn take_elapsed(&mut self, generation: u64) -> bool {
        if self.handle.is_some() && generation == self.generation {
            self.handle = None;
            true
        } else {
            false
        }
    }
}

impl Drop for CallEndTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
