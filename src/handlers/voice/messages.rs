//! Voice WebSocket message types
//!
//! Client → server traffic is mostly raw: binary frames carry PCM chunks and
//! text frames carry either a control word or a typed utterance. Server →
//! client text frames are JSON objects tagged by `type`.

use bytes::Bytes;
use serde::Serialize;

/// Maximum allowed size for a typed utterance (50 KB)
pub const MAX_TEXT_SIZE: usize = 50 * 1024;

/// Control word that starts (or restarts) a call
pub const START_AUDIO_STREAM: &str = "start_audio_stream";

/// Control word that ends a call from the client side
pub const STOP_AUDIO_STREAM: &str = "stop_audio_stream";

// =============================================================================
// Incoming Frames (Client -> Server)
// =============================================================================

/// A frame received from the client, already classified
#[derive(Debug, Clone, PartialEq)]
pub enum ClientFrame {
    /// One PCM audio chunk
    Audio(Bytes),
    /// `start_audio_stream`
    StartStream,
    /// `stop_audio_stream`
    StopStream,
    /// Any other text: an utterance typed by the user
    Text(String),
}

impl ClientFrame {
    /// Classify a text frame
    pub fn from_text(text: &str) -> Self {
        match text.trim() {
            START_AUDIO_STREAM => Self::StartStream,
            STOP_AUDIO_STREAM => Self::StopStream,
            _ => Self::Text(text.to_string()),
        }
    }
}

// =============================================================================
// Outgoing Messages (Server -> Client)
// =============================================================================

/// Why the server ended the call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallEndReason {
    /// The client sent `stop_audio_stream`
    ManualStop,
    /// Silence outlasted the call-end delay
    ProlongedSilence,
}

/// Outgoing WebSocket messages to client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum OutgoingMessage {
    /// Chat line (`You: ...`, `Bot: ...`, `Server: ...`)
    #[serde(rename = "message")]
    Message { text: String },

    /// Emotion detected in the user's last utterance
    #[serde(rename = "emotion")]
    Emotion { value: String },

    /// Upstream failure notice
    #[serde(rename = "error")]
    Error { message: String },

    #[serde(rename = "call_ended_by_server")]
    CallEnded { reason: CallEndReason },
}

impl OutgoingMessage {
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message { text: text.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

// =============================================================================
// Message Routing
// =============================================================================

/// What the writer task should put on the socket
#[derive(Debug, Clone, PartialEq)]
pub enum MessageRoute {
    /// JSON text message
    Outgoing(OutgoingMessage),
    /// Synthesized audio
    Audio(Bytes),
    /// Close connection
    Close,
}
