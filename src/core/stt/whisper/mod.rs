//! Whisper + speech-emotion-recognition microservice.

mod client;
pub mod messages;

pub use client::{DEFAULT_TRANSCRIPTION_URL, WhisperEmotionSTT};
