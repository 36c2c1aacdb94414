//! Wire types for the Whisper + emotion transcription service.

use serde::{Deserialize, Serialize};

/// Request body: one utterance of base64-encoded PCM
#[derive(Debug, Serialize)]
pub struct TranscriptionRequest<'a> {
    pub audio: &'a str,
}

/// Successful response body.
///
/// The service names the text field `transcription`; `transcript` is
/// accepted as well.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TranscriptionResponse {
    #[serde(default, alias = "transcript")]
    pub transcription: Option<String>,
    #[serde(default)]
    pub emotion: Option<String>,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionErrorResponse {
    pub error: String,
}
