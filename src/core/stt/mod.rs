//! Speech-to-text collaborators.
//!
//! The engine only needs one operation from a transcription service: turn an
//! utterance of PCM audio into a transcript plus an emotion label. The
//! [`Transcriber`] trait is that seam; [`WhisperEmotionSTT`] is the HTTP
//! client for the Whisper + emotion microservice.

mod base;
pub mod whisper;

pub use base::{
    STTError, SYSTEM_PLACEHOLDERS, Transcriber, Transcription, is_system_placeholder,
};
pub use whisper::{DEFAULT_TRANSCRIPTION_URL, WhisperEmotionSTT};
