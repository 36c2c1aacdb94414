use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Transcripts the transcription service emits about the audio itself rather
/// than about what the user said. They are directives for the user and must
/// never be forwarded to text generation.
pub const SYSTEM_PLACEHOLDERS: &[&str] = &[
    "Please speak a bit louder, I didn't catch that clearly.",
    "Please speak a bit longer, I didn't catch that clearly.",
    "Please try speaking again, I didn't catch that clearly.",
    "No audio detected.",
];

/// Check whether a transcript is one of the service's system placeholders
/// (exact match after trimming).
#[inline]
pub fn is_system_placeholder(transcript: &str) -> bool {
    let trimmed = transcript.trim();
    SYSTEM_PLACEHOLDERS.iter().any(|p| *p == trimmed)
}

/// Result of transcribing one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcription {
    /// Transcribed text (may be a system placeholder)
    pub transcript: String,
    /// Emotion label detected for the utterance
    pub emotion: String,
}

impl Transcription {
    pub fn new(transcript: impl Into<String>, emotion: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            emotion: emotion.into(),
        }
    }

    /// Whether the transcript is a system placeholder
    pub fn is_system_placeholder(&self) -> bool {
        is_system_placeholder(&self.transcript)
    }
}

/// Errors that can occur while talking to the transcription service
#[derive(Debug, Error, Clone, PartialEq)]
pub enum STTError {
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("API returned status {status}: {body}")]
    ProviderError { status: u16, body: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Speech-to-text + emotion classification service
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe one utterance of raw PCM audio
    async fn transcribe(&self, audio: Bytes) -> Result<Transcription, STTError>;

    /// Short provider name for logging
    fn provider_name(&self) -> &'static str;
}
