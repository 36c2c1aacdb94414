//! Conversational turns.
//!
//! A turn takes one utterance (or directly typed text) through
//! transcription, reply generation and streamed synthesis. It runs on its
//! own task and reports back through an ordered channel of [`TurnUpdate`]s;
//! the session loop decides what reaches the peer. Cancellation is checked
//! between stages and before every audio chunk.

mod events;
mod orchestrator;

pub use events::{
    CREDENTIALS_FAILURE_NOTICE, Capability, FailureKind, GENERIC_FAILURE_NOTICE,
    SYNTHESIS_PERMISSION_NOTICE, TurnError, TurnEvent, TurnInput, TurnOutcome, TurnUpdate,
};
pub use orchestrator::{TurnOrchestrator, TurnServices, TurnStage};
