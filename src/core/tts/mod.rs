//! Speech synthesis.
//!
//! [`SpeechSynthesizer`] turns reply text into an ordered stream of audio
//! chunks. [`ElevenLabsTTS`] implements it over the ElevenLabs streaming
//! endpoint.

mod base;
pub mod elevenlabs;

pub use base::{AudioStream, SpeechSynthesizer, TTSError};
pub use elevenlabs::{
    DEFAULT_ELEVENLABS_MODEL_ID, DEFAULT_ELEVENLABS_VOICE_ID, ELEVENLABS_API_BASE_URL,
    ElevenLabsTTS,
};
