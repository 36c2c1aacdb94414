//! Per-connection event loop
//!
//! One driver owns one [`Session`]. It serializes three sources of events:
//! client frames, call-end timer expiries, and updates from the turn task.
//! Turns run on their own tasks and only ever reach the peer through here,
//! so anything a cancelled turn still emits is dropped by turn id.

use std::sync::Arc;

use bytes::Bytes;
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::messages::{CallEndReason, ClientFrame, MAX_TEXT_SIZE, MessageRoute, OutgoingMessage};
use crate::core::session::{CallEndDecision, Session, SessionConfig, TimerEvent};
use crate::core::turn::{
    FailureKind, TurnEvent, TurnInput, TurnOrchestrator, TurnServices, TurnUpdate,
};

/// Buffer size for turn updates; synthesized audio flows through here
const TURN_CHANNEL_SIZE: usize = 256;

pub struct SessionDriver {
    session: Session,
    orchestrator: TurnOrchestrator,
    outbound: mpsc::Sender<MessageRoute>,
    timer_rx: mpsc::UnboundedReceiver<TimerEvent>,
    turn_tx: mpsc::Sender<TurnUpdate>,
    turn_rx: mpsc::Receiver<TurnUpdate>,
}

impl SessionDriver {
    pub fn new(
        session_id: impl Into<String>,
        config: Arc<SessionConfig>,
        services: Arc<TurnServices>,
        outbound: mpsc::Sender<MessageRoute>,
    ) -> Self {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (turn_tx, turn_rx) = mpsc::channel(TURN_CHANNEL_SIZE);
        let orchestrator = TurnOrchestrator::new(
            services,
            config.temperature,
            config.min_utterance_bytes(),
        );
        Self {
            session: Session::new(session_id, config, timer_tx),
            orchestrator,
            outbound,
            timer_rx,
            turn_tx,
            turn_rx,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run until the inbound channel closes or the peer goes away, then ask
    /// the writer to close the socket
    pub async fn run(mut self, mut inbound: mpsc::Receiver<ClientFrame>) {
        info!(session_id = %self.session.id(), "Session started");

        loop {
            let keep_going = select! {
                biased;
                frame = inbound.recv() => match frame {
                    Some(frame) => self.handle_frame(frame).await,
                    None => {
                        debug!(session_id = %self.session.id(), "Inbound channel closed");
                        false
                    }
                },
                Some(event) = self.timer_rx.recv() => self.handle_timer(event).await,
                Some(update) = self.turn_rx.recv() => self.handle_turn_update(update).await,
            };

            if !keep_going {
                break;
            }
        }

        self.session.close();
        // Let the writer flush what is queued and close the socket
        let _ = self.outbound.send(MessageRoute::Close).await;
        info!(session_id = %self.session.id(), "Session closed");
    }

    // =========================================================================
    // Client frames
    // =========================================================================

    async fn handle_frame(&mut self, frame: ClientFrame) -> bool {
        match frame {
            ClientFrame::Audio(chunk) => {
                let outcome = self.session.on_audio(chunk, Instant::now());
                if outcome.barged_in {
                    debug!(session_id = %self.session.id(), "Barge-in handled");
                }
                if let Some(utterance) = outcome.utterance {
                    self.start_audio_turn(utterance);
                }
                true
            }
            ClientFrame::StartStream => {
                info!(session_id = %self.session.id(), "Client started audio stream");
                self.session.on_start_stream();
                true
            }
            ClientFrame::StopStream => {
                info!(session_id = %self.session.id(), "Client stopped audio stream");
                if let Some(utterance) = self.session.on_stop_stream() {
                    self.start_audio_turn(utterance);
                }
                self.send(OutgoingMessage::CallEnded {
                    reason: CallEndReason::ManualStop,
                })
                .await
            }
            ClientFrame::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    debug!(session_id = %self.session.id(), "Ignoring blank text frame");
                    return true;
                }
                if text.len() > MAX_TEXT_SIZE {
                    warn!(
                        session_id = %self.session.id(),
                        size = text.len(),
                        "Text message too large"
                    );
                    return self
                        .send(OutgoingMessage::error(format!(
                            "Text message too large: {} bytes (max {MAX_TEXT_SIZE})",
                            text.len()
                        )))
                        .await;
                }
                self.start_turn(TurnInput::Text(text.to_string()));
                true
            }
        }
    }

    fn start_audio_turn(&mut self, utterance: Bytes) {
        if !self.orchestrator.admits(&utterance) {
            debug!(
                session_id = %self.session.id(),
                bytes = utterance.len(),
                "Utterance below minimum length, discarding"
            );
            self.session.discard_utterance();
            return;
        }
        self.start_turn(TurnInput::Audio(utterance));
    }

    fn start_turn(&mut self, input: TurnInput) {
        let (turn_id, cancel) = self.session.begin_turn();
        debug!(session_id = %self.session.id(), turn_id, "Starting turn");
        // Detached: the turn reports back through `turn_tx` and stops on `cancel`
        let _ = self.orchestrator.spawn(
            turn_id,
            input,
            self.session.history().to_vec(),
            cancel,
            self.turn_tx.clone(),
        );
    }

    // =========================================================================
    // Timers
    // =========================================================================

    async fn handle_timer(&mut self, event: TimerEvent) -> bool {
        match event {
            TimerEvent::CallEndElapsed { generation } => {
                match self.session.on_call_end_elapsed(generation) {
                    CallEndDecision::Ended => {
                        self.send(OutgoingMessage::CallEnded {
                            reason: CallEndReason::ProlongedSilence,
                        })
                        .await
                    }
                    CallEndDecision::Deferred | CallEndDecision::Stale => true,
                }
            }
        }
    }

    // =========================================================================
    // Turn updates
    // =========================================================================

    async fn handle_turn_update(&mut self, update: TurnUpdate) -> bool {
        let TurnUpdate { turn_id, event } = update;
        if !self.session.is_current_turn(turn_id) {
            debug!(session_id = %self.session.id(), turn_id, "Dropping update from stale turn");
            return true;
        }

        match event {
            TurnEvent::Message(text) => self.send(OutgoingMessage::Message { text }).await,
            TurnEvent::Emotion(value) => self.send(OutgoingMessage::Emotion { value }).await,
            TurnEvent::Capability(capability) => {
                if self.session.note_capability(capability) {
                    self.send(OutgoingMessage::message(capability.missing_notice()))
                        .await
                } else {
                    true
                }
            }
            TurnEvent::ReplyReady { user, assistant } => {
                self.session.stage_exchange(user, assistant);
                true
            }
            TurnEvent::SpeakingStarted => {
                self.session.mark_speaking();
                true
            }
            TurnEvent::Audio(chunk) => {
                if !self.session.is_assistant_speaking() {
                    return true;
                }
                self.route(MessageRoute::Audio(chunk)).await
            }
            TurnEvent::UpstreamOk(kind) => {
                self.session.record_upstream_success(kind);
                true
            }
            TurnEvent::Failed { kind, message } => self.notify_failure(kind, message).await,
            TurnEvent::Finished(outcome) => {
                debug!(session_id = %self.session.id(), turn_id, ?outcome, "Turn ended");
                self.session.finish_turn(turn_id);
                true
            }
        }
    }

    async fn notify_failure(&mut self, kind: FailureKind, message: String) -> bool {
        if !self.session.should_notify(kind, Instant::now()) {
            debug!(
                session_id = %self.session.id(),
                stage = %kind,
                "Suppressing repeated failure notice"
            );
            return true;
        }
        if !self.send(OutgoingMessage::error(message.clone())).await {
            return false;
        }
        match kind {
            FailureKind::Transcription => true,
            FailureKind::Generation | FailureKind::Synthesis => {
                self.send(OutgoingMessage::message(message)).await
            }
        }
    }

    // =========================================================================
    // Outbound
    // =========================================================================

    async fn send(&self, message: OutgoingMessage) -> bool {
        self.route(MessageRoute::Outgoing(message)).await
    }

    /// `false` once the writer is gone
    async fn route(&self, route: MessageRoute) -> bool {
        if self.outbound.send(route).await.is_err() {
            debug!(session_id = %self.session.id(), "Outbound channel closed");
            return false;
        }
        true
    }
}
