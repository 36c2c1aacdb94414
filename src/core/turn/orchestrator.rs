use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::events::{
    Capability, FailureKind, TurnError, TurnEvent, TurnInput, TurnOutcome, TurnUpdate,
};
use crate::core::emotion::Emotion;
use crate::core::llm::{
    ConversationEntry, LLMError, TextGenerator, extract_direct_reply, render_user_prompt,
};
use crate::core::stt::Transcriber;
use crate::core::tts::SpeechSynthesizer;

/// Upstream services available to turns.
///
/// Generation and synthesis are optional: a process started without their
/// credentials still transcribes and reports the missing capability.
#[derive(Clone)]
pub struct TurnServices {
    pub transcriber: Arc<dyn Transcriber>,
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
}

impl TurnServices {
    pub fn new(transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            transcriber,
            generator: None,
            synthesizer: None,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }
}

impl std::fmt::Debug for TurnServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnServices")
            .field("transcriber", &self.transcriber.provider_name())
            .field("generator", &self.generator.as_ref().map(|g| g.provider_name()))
            .field(
                "synthesizer",
                &self.synthesizer.as_ref().map(|s| s.provider_name()),
            )
            .finish()
    }
}

/// Stage of a running turn
#[derive(Debug)]
pub enum TurnStage {
    Transcribing(Bytes),
    Generating { text: String, emotion: String },
    Synthesizing { reply: String },
    Done(TurnOutcome),
}

struct TurnContext {
    turn_id: u64,
    cancel: CancellationToken,
    events: mpsc::Sender<TurnUpdate>,
    history: Vec<ConversationEntry>,
}

impl TurnContext {
    /// Send an event to the session loop. A closed loop cancels the turn.
    async fn emit(&self, event: TurnEvent) -> bool {
        let update = TurnUpdate {
            turn_id: self.turn_id,
            event,
        };
        if self.events.send(update).await.is_err() {
            self.cancel.cancel();
            return false;
        }
        true
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Await `fut` unless the turn is cancelled first
    async fn race<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            out = fut => Some(out),
        }
    }
}

/// Runs turns: transcription, then generation, then streamed synthesis
#[derive(Debug, Clone)]
pub struct TurnOrchestrator {
    services: Arc<TurnServices>,
    temperature: f32,
    min_utterance_bytes: usize,
}

impl TurnOrchestrator {
    pub fn new(services: Arc<TurnServices>, temperature: f32, min_utterance_bytes: usize) -> Self {
        Self {
            services,
            temperature,
            min_utterance_bytes,
        }
    }

    /// Whether a flushed utterance is long enough to transcribe
    pub fn admits(&self, audio: &[u8]) -> bool {
        audio.len() >= self.min_utterance_bytes
    }

    /// Run a turn on its own task
    pub fn spawn(
        &self,
        turn_id: u64,
        input: TurnInput,
        history: Vec<ConversationEntry>,
        cancel: CancellationToken,
        events: mpsc::Sender<TurnUpdate>,
    ) -> JoinHandle<TurnOutcome> {
        let this = self.clone();
        tokio::spawn(async move { this.run(turn_id, input, history, cancel, events).await })
    }

    /// Drive a turn to completion.
    ///
    /// `history` is the transcript snapshot taken when the turn started.
    /// Every event is tagged with `turn_id`; the last one is always
    /// [`TurnEvent::Finished`].
    pub async fn run(
        &self,
        turn_id: u64,
        input: TurnInput,
        history: Vec<ConversationEntry>,
        cancel: CancellationToken,
        events: mpsc::Sender<TurnUpdate>,
    ) -> TurnOutcome {
        let ctx = TurnContext {
            turn_id,
            cancel,
            events,
            history,
        };

        let mut stage = match input {
            TurnInput::Audio(audio) => TurnStage::Transcribing(audio),
            TurnInput::Text(text) => TurnStage::Generating {
                text,
                emotion: Emotion::Neutral.as_str().to_string(),
            },
        };

        let outcome = loop {
            let step = match stage {
                TurnStage::Done(outcome) => break outcome,
                _ if ctx.is_cancelled() => Ok(TurnStage::Done(TurnOutcome::Cancelled)),
                TurnStage::Transcribing(audio) => self.transcribe(&ctx, audio).await,
                TurnStage::Generating { text, emotion } => {
                    self.generate(&ctx, text, emotion).await
                }
                TurnStage::Synthesizing { reply } => self.synthesize(&ctx, reply).await,
            };

            stage = match step {
                Ok(next) => next,
                Err(e) => {
                    let kind = e.kind();
                    warn!(turn_id, stage = %kind, "Turn failed: {}", e);
                    ctx.emit(TurnEvent::Failed {
                        kind,
                        message: e.peer_message(),
                    })
                    .await;
                    TurnStage::Done(TurnOutcome::Failed(kind))
                }
            };
        };

        debug!(turn_id, ?outcome, "Turn finished");
        ctx.emit(TurnEvent::Finished(outcome)).await;
        outcome
    }

    async fn transcribe(&self, ctx: &TurnContext, audio: Bytes) -> Result<TurnStage, TurnError> {
        info!(turn_id = ctx.turn_id, bytes = audio.len(), "Transcribing utterance");
        let Some(result) = ctx.race(self.services.transcriber.transcribe(audio)).await else {
            return Ok(TurnStage::Done(TurnOutcome::Cancelled));
        };
        let transcription = result?;
        ctx.emit(TurnEvent::UpstreamOk(FailureKind::Transcription)).await;

        let text = transcription.transcript.trim().to_string();
        if transcription.is_system_placeholder() {
            // A directive about the audio, not something the user said
            ctx.emit(TurnEvent::Message(format!("Bot: {text}"))).await;
            return Ok(TurnStage::Done(TurnOutcome::Completed));
        }
        if text.is_empty() {
            ctx.emit(TurnEvent::Emotion(Emotion::Neutral.as_str().to_string()))
                .await;
            return Ok(TurnStage::Done(TurnOutcome::Completed));
        }

        ctx.emit(TurnEvent::Message(format!("You: {text}"))).await;
        ctx.emit(TurnEvent::Emotion(transcription.emotion.clone()))
            .await;
        Ok(TurnStage::Generating {
            text,
            emotion: transcription.emotion,
        })
    }

    async fn generate(
        &self,
        ctx: &TurnContext,
        text: String,
        emotion: String,
    ) -> Result<TurnStage, TurnError> {
        let Some(generator) = self.services.generator.as_ref() else {
            ctx.emit(TurnEvent::Capability(Capability::Generation)).await;
            return Ok(TurnStage::Done(TurnOutcome::Completed));
        };

        let user = ConversationEntry::user(render_user_prompt(&text, &emotion));
        let mut history = ctx.history.clone();
        history.push(user.clone());

        let Some(result) = ctx
            .race(generator.generate(&history, self.temperature))
            .await
        else {
            return Ok(TurnStage::Done(TurnOutcome::Cancelled));
        };
        let raw = result?;
        let reply = extract_direct_reply(&raw).ok_or(LLMError::EmptyResponse)?;
        ctx.emit(TurnEvent::UpstreamOk(FailureKind::Generation)).await;
        debug!(turn_id = ctx.turn_id, raw_len = raw.len(), reply = %reply, "Reply selected");

        ctx.emit(TurnEvent::ReplyReady {
            user,
            assistant: ConversationEntry::assistant(reply.clone()),
        })
        .await;
        ctx.emit(TurnEvent::Message(format!("Bot: {reply}"))).await;
        Ok(TurnStage::Synthesizing { reply })
    }

    async fn synthesize(&self, ctx: &TurnContext, reply: String) -> Result<TurnStage, TurnError> {
        let Some(synthesizer) = self.services.synthesizer.as_ref() else {
            ctx.emit(TurnEvent::Capability(Capability::Synthesis)).await;
            return Ok(TurnStage::Done(TurnOutcome::Completed));
        };

        let Some(result) = ctx.race(synthesizer.synthesize(&reply)).await else {
            return Ok(TurnStage::Done(TurnOutcome::Cancelled));
        };
        let mut stream = result?;

        ctx.emit(TurnEvent::SpeakingStarted).await;
        let mut chunks = 0usize;
        loop {
            let Some(next) = ctx.race(stream.next()).await else {
                info!(turn_id = ctx.turn_id, chunks, "Synthesis interrupted");
                return Ok(TurnStage::Done(TurnOutcome::Cancelled));
            };
            let Some(chunk) = next else { break };
            let chunk = chunk?;
            if ctx.is_cancelled() || !ctx.emit(TurnEvent::Audio(chunk)).await {
                return Ok(TurnStage::Done(TurnOutcome::Cancelled));
            }
            chunks += 1;
        }

        debug!(turn_id = ctx.turn_id, chunks, "Synthesis stream complete");
        ctx.emit(TurnEvent::UpstreamOk(FailureKind::Synthesis)).await;
        Ok(TurnStage::Done(TurnOutcome::Completed))
    }
}
