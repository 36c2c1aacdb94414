use std::fmt;

use bytes::Bytes;
use thiserror::Error;

use crate::core::llm::{ConversationEntry, LLMError};
use crate::core::stt::STTError;
use crate::core::tts::TTSError;

/// Peer-facing text for unexpected generation or synthesis failures
pub const GENERIC_FAILURE_NOTICE: &str =
    "Server: Sorry, I encountered an error trying to process that.";
/// Peer-facing text when an upstream rejects the configured credentials
pub const CREDENTIALS_FAILURE_NOTICE: &str =
    "Server: My AI brain or voice seems disconnected! Please check the API keys.";
/// Peer-facing text when the synthesis key lacks the TTS permission
pub const SYNTHESIS_PERMISSION_NOTICE: &str = "Server: ElevenLabs API key missing required permissions. Please check your ElevenLabs account settings.";

/// Upstream stage a failure is attributed to; the debouncing key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Transcription,
    Generation,
    Synthesis,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transcription => "transcription",
            FailureKind::Generation => "generation",
            FailureKind::Synthesis => "synthesis",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional upstream that may be unconfigured for the whole process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Generation,
    Synthesis,
}

impl Capability {
    /// Message sent to the peer the first time the capability is missed
    pub fn missing_notice(&self) -> &'static str {
        match self {
            Capability::Generation => {
                "Server: My AI capabilities are not configured (missing Gemini API key)."
            }
            Capability::Synthesis => {
                "Server: My voice is not configured (missing ElevenLabs API key)."
            }
        }
    }
}

/// Failure of one turn stage
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("transcription failed: {0}")]
    Transcription(#[from] STTError),
    #[error("generation failed: {0}")]
    Generation(#[from] LLMError),
    #[error("synthesis failed: {0}")]
    Synthesis(#[from] TTSError),
}

fn is_auth_status(status: u16) -> bool {
    status == 401 || status == 403
}

impl TurnError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TurnError::Transcription(_) => FailureKind::Transcription,
            TurnError::Generation(_) => FailureKind::Generation,
            TurnError::Synthesis(_) => FailureKind::Synthesis,
        }
    }

    /// Text reported to the peer for this failure
    pub fn peer_message(&self) -> String {
        match self {
            TurnError::Transcription(e) => format!("Failed to connect to STT/Emotion API: {e}"),
            TurnError::Generation(LLMError::ProviderError { status, .. })
                if is_auth_status(*status) =>
            {
                CREDENTIALS_FAILURE_NOTICE.to_string()
            }
            TurnError::Generation(LLMError::ConfigurationError(_)) => {
                CREDENTIALS_FAILURE_NOTICE.to_string()
            }
            TurnError::Synthesis(TTSError::PermissionDenied(_)) => {
                SYNTHESIS_PERMISSION_NOTICE.to_string()
            }
            TurnError::Synthesis(TTSError::ProviderError { status, .. })
                if is_auth_status(*status) =>
            {
                CREDENTIALS_FAILURE_NOTICE.to_string()
            }
            TurnError::Synthesis(TTSError::ConfigurationError(_)) => {
                CREDENTIALS_FAILURE_NOTICE.to_string()
            }
            TurnError::Generation(_) | TurnError::Synthesis(_) => {
                GENERIC_FAILURE_NOTICE.to_string()
            }
        }
    }
}

/// How a turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    Cancelled,
    Failed(FailureKind),
}

/// What a turn asks the session loop to do, in emission order
#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent {
    /// Chat line for the peer (`You: ...`, `Bot: ...`)
    Message(String),
    /// Detected emotion label
    Emotion(String),
    /// A step was skipped because its upstream is not configured
    Capability(Capability),
    /// The user/assistant exchange to append to the transcript
    ReplyReady {
        user: ConversationEntry,
        assistant: ConversationEntry,
    },
    /// Synthesized audio is about to stream
    SpeakingStarted,
    Audio(Bytes),
    /// An upstream call of this kind succeeded
    UpstreamOk(FailureKind),
    Failed {
        kind: FailureKind,
        message: String,
    },
    Finished(TurnOutcome),
}

/// A [`TurnEvent`] tagged with the turn that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct TurnUpdate {
    pub turn_id: u64,
    pub event: TurnEvent,
}

/// What a turn starts from
#[derive(Debug, Clone)]
pub enum TurnInput {
    /// Captured utterance audio
    Audio(Bytes),
    /// Text supplied directly by the client, bypassing transcription
    Text(String),
}
