use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::buffer::UtteranceBuffer;
use super::config::SessionConfig;
use super::debounce::ErrorDebouncer;
use super::timers::{CallEndTimer, SilenceTracker, TimerEvent};
use crate::core::llm::ConversationEntry;
use crate::core::turn::{Capability, FailureKind};
use crate::core::vad::{ChunkClass, EnergyDetector, VoiceActivityDetector};

/// Where the session stands in utterance segmentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryState {
    /// Speech (or nothing) since the last boundary
    Listening,
    /// Silence began; waiting for the boundary delay
    SilenceAccumulating,
    /// The boundary was reached and the buffer flushed
    UtteranceReady,
    /// Silence outlasted the boundary delay without an utterance to flush;
    /// only the call-end timeout is left running
    CallEndArmed,
}

/// Result of feeding one audio chunk into the session
#[derive(Debug)]
pub struct AudioOutcome {
    /// The chunk interrupted assistant speech
    pub barged_in: bool,
    /// Classification, `None` when the chunk was ignored
    pub class: Option<ChunkClass>,
    /// Flushed utterance, present when a boundary was reached
    pub utterance: Option<Bytes>,
    pub state: BoundaryState,
}

/// Result of a call-end timer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEndDecision {
    /// Generation no longer current
    Stale,
    /// A turn is in flight; the timer was re-armed
    Deferred,
    /// The call is over
    Ended,
}

#[derive(Debug)]
struct ActiveTurn {
    id: u64,
    cancel: CancellationToken,
    staged_exchange: Option<(ConversationEntry, ConversationEntry)>,
}

/// Mutable state of one live connection.
///
/// All mutation happens on the session's own event loop, so no locking is
/// needed. Timestamps are passed in by the caller.
#[derive(Debug)]
pub struct Session {
    id: String,
    config: Arc<SessionConfig>,
    detector: EnergyDetector,
    buffer: UtteranceBuffer,
    silence: SilenceTracker,
    call_end: CallEndTimer,
    processing: bool,
    assistant_speaking: bool,
    transcript: Vec<ConversationEntry>,
    debouncer: ErrorDebouncer,
    capability_notices: HashSet<Capability>,
    active_turn: Option<ActiveTurn>,
    next_turn_id: u64,
    call_active: bool,
}

impl Session {
    pub fn new(
        id: impl Into<String>,
        config: Arc<SessionConfig>,
        timer_events: mpsc::UnboundedSender<TimerEvent>,
    ) -> Self {
        Self {
            id: id.into(),
            detector: EnergyDetector::new(&config.vad),
            buffer: UtteranceBuffer::new(),
            silence: SilenceTracker::default(),
            call_end: CallEndTimer::new(config.call_end_delay, timer_events),
            processing: false,
            assistant_speaking: false,
            transcript: Vec::new(),
            debouncer: ErrorDebouncer::new(config.error_cooldown),
            capability_notices: HashSet::new(),
            active_turn: None,
            next_turn_id: 1,
            call_active: true,
            config,
        }
    }

    // =========================================================================
    // Audio path
    // =========================================================================

    /// Process one inbound audio chunk.
    ///
    /// Barge-in runs first: if the assistant is speaking, the active turn is
    /// cancelled and segmentation restarts before the chunk is classified.
    pub fn on_audio(&mut self, chunk: Bytes, now: Instant) -> AudioOutcome {
        if !self.call_active {
            debug!(session_id = %self.id, bytes = chunk.len(), "Call not active, ignoring audio");
            return AudioOutcome {
                barged_in: false,
                class: None,
                utterance: None,
                state: self.boundary_state(),
            };
        }

        let barged_in = self.assistant_speaking;
        if barged_in {
            info!(session_id = %self.id, "User audio while assistant speaking, interrupting");
            self.cancel_active_turn();
            self.reset_listening();
        }

        let class = self.detector.classify(&chunk);
        let mut utterance = None;

        match class {
            ChunkClass::Speech => {
                if self.silence.is_accumulating() {
                    debug!(session_id = %self.id, "Speech resumed");
                    self.silence.clear();
                    self.call_end.cancel();
                    self.buffer.commit_pending();
                }
                self.buffer.append(chunk);
            }
            ChunkClass::Silence => match self.silence.elapsed(now) {
                None => {
                    debug!(session_id = %self.id, "Silence started");
                    self.silence.start(now);
                    self.call_end.arm();
                    self.buffer.hold_silence(chunk);
                }
                Some(elapsed) => {
                    self.buffer.hold_silence(chunk);
                    let past_boundary = elapsed > self.config.utterance_boundary;
                    if past_boundary
                        && !self.processing
                        && self.buffer.chunk_count() >= self.config.min_chunks()
                    {
                        let audio = self.buffer.flush();
                        info!(
                            session_id = %self.id,
                            bytes = audio.len(),
                            silence_ms = elapsed.as_millis() as u64,
                            "Utterance boundary reached"
                        );
                        self.reset_listening();
                        self.processing = true;
                        utterance = Some(audio);
                    } else if past_boundary {
                        self.silence.mark_boundary_passed();
                    }
                }
            },
        }

        let state = if utterance.is_some() {
            BoundaryState::UtteranceReady
        } else {
            self.boundary_state()
        };
        AudioOutcome {
            barged_in,
            class: Some(class),
            utterance,
            state,
        }
    }

    /// Handle a call-end timer event
    pub fn on_call_end_elapsed(&mut self, generation: u64) -> CallEndDecision {
        if !self.call_end.take_elapsed(generation) {
            return CallEndDecision::Stale;
        }
        if self.processing || self.assistant_speaking {
            debug!(session_id = %self.id, "Call-end deferred while a turn is in flight");
            self.call_end.arm();
            return CallEndDecision::Deferred;
        }
        info!(session_id = %self.id, "Prolonged silence, ending call");
        self.reset();
        self.call_active = false;
        CallEndDecision::Ended
    }

    /// Caller dropped a flushed utterance (below the byte floor)
    pub fn discard_utterance(&mut self) {
        if self.active_turn.is_none() {
            self.processing = false;
        }
    }

    // =========================================================================
    // Control signals
    // =========================================================================

    /// `start_audio_stream`: begin a fresh call. Idempotent.
    pub fn on_start_stream(&mut self) {
        self.reset();
        self.debouncer.clear();
        self.call_active = true;
    }

    /// `stop_audio_stream`: flush what is buffered if it is long enough,
    /// otherwise drop it. The call ends either way.
    ///
    /// A turn still in flight does not hold the flush back; starting the
    /// next turn cancels it.
    pub fn on_stop_stream(&mut self) -> Option<Bytes> {
        let utterance = if self.buffer.chunk_count() >= self.config.min_chunks() {
            let audio = self.buffer.flush();
            self.processing = true;
            Some(audio)
        } else {
            None
        };
        self.reset_listening();
        self.call_active = false;
        utterance
    }

    /// Clear segmentation and cancel any turn
    pub fn reset(&mut self) {
        self.cancel_active_turn();
        self.reset_listening();
        self.processing = false;
        self.assistant_speaking = false;
    }

    /// Clear the buffer and silence timers, leaving any turn running
    pub fn reset_listening(&mut self) {
        self.buffer.clear();
        self.silence.clear();
        self.call_end.cancel();
    }

    /// Tear down on disconnect
    pub fn close(&mut self) {
        self.reset();
        self.call_active = false;
    }

    // =========================================================================
    // Turn bookkeeping
    // =========================================================================

    /// Register a new turn, cancelling the active one if any
    pub fn begin_turn(&mut self) -> (u64, CancellationToken) {
        self.cancel_active_turn();
        let id = self.next_turn_id;
        self.next_turn_id += 1;
        let cancel = CancellationToken::new();
        self.active_turn = Some(ActiveTurn {
            id,
            cancel: cancel.clone(),
            staged_exchange: None,
        });
        self.processing = true;
        (id, cancel)
    }

    pub fn is_current_turn(&self, turn_id: u64) -> bool {
        self.active_turn.as_ref().is_some_and(|t| t.id == turn_id)
    }

    pub fn mark_speaking(&mut self) {
        if self.active_turn.is_some() {
            self.assistant_speaking = true;
        }
    }

    /// Remember the exchange of the active turn until it ends
    pub fn stage_exchange(&mut self, user: ConversationEntry, assistant: ConversationEntry) {
        if let Some(turn) = self.active_turn.as_mut() {
            turn.staged_exchange = Some((user, assistant));
        }
    }

    /// The active turn ended on its own
    pub fn finish_turn(&mut self, turn_id: u64) {
        if !self.is_current_turn(turn_id) {
            return;
        }
        if let Some(turn) = self.active_turn.take() {
            self.commit_exchange(turn.staged_exchange);
        }
        self.processing = false;
        self.assistant_speaking = false;
    }

    /// Cancel the active turn, keeping an exchange it already produced
    pub fn cancel_active_turn(&mut self) {
        if let Some(turn) = self.active_turn.take() {
            debug!(session_id = %self.id, turn_id = turn.id, "Cancelling turn");
            turn.cancel.cancel();
            self.commit_exchange(turn.staged_exchange);
            self.processing = false;
            self.assistant_speaking = false;
        }
    }

    fn commit_exchange(&mut self, exchange: Option<(ConversationEntry, ConversationEntry)>) {
        if let Some((user, assistant)) = exchange {
            self.transcript.push(user);
            self.transcript.push(assistant);
        }
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Record a capability notice; `true` the first time per session
    pub fn note_capability(&mut self, capability: Capability) -> bool {
        self.capability_notices.insert(capability)
    }

    pub fn should_notify(&mut self, kind: FailureKind, now: Instant) -> bool {
        self.debouncer.should_notify(kind, now)
    }

    /// A working upstream re-enables immediate notices for its own kind
    pub fn record_upstream_success(&mut self, kind: FailureKind) {
        self.debouncer.clear_kind(kind);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn history(&self) -> &[ConversationEntry] {
        &self.transcript
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn is_assistant_speaking(&self) -> bool {
        self.assistant_speaking
    }

    pub fn is_call_active(&self) -> bool {
        self.call_active
    }

    pub fn is_call_end_armed(&self) -> bool {
        self.call_end.is_armed()
    }

    pub fn buffered_chunks(&self) -> usize {
        self.buffer.chunk_count()
    }

    pub fn silence_started_at(&self) -> Option<Instant> {
        self.silence.started_at()
    }

    pub fn boundary_state(&self) -> BoundaryState {
        if !self.silence.is_accumulating() {
            BoundaryState::Listening
        } else if self.silence.boundary_passed() && self.call_end.is_armed() {
            BoundaryState::CallEndArmed
        } else {
            BoundaryState::SilenceAccumulating
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(turn) = self.active_turn.take() {
            turn.cancel.cancel();
        }
    }
}
