//! HTTP client for the Whisper + emotion transcription service.
//!
//! The service is a plain REST endpoint: one POST per utterance carrying the
//! raw PCM as base64 inside a JSON body, answered with the transcript and the
//! detected emotion. It is not streaming, so the whole utterance is sent at
//! once after the silence boundary is detected.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, info, warn};

use super::super::base::{STTError, Transcriber, Transcription};
use super::messages::{TranscriptionErrorResponse, TranscriptionRequest, TranscriptionResponse};

/// Default endpoint of the locally hosted transcription service
pub const DEFAULT_TRANSCRIPTION_URL: &str = "http://localhost:5001/transcribe_and_emotion";

/// Emotion reported when the service omits one
const DEFAULT_EMOTION: &str = "neutral";

/// Whisper + emotion transcription client implementing [`Transcriber`]
#[derive(Debug, Clone)]
pub struct WhisperEmotionSTT {
    http_client: Client,
    url: String,
}

impl WhisperEmotionSTT {
    /// Create a client with its own connection pool
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, STTError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| STTError::ConfigurationError(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(http_client, url))
    }

    /// Create a client sharing an existing connection pool
    pub fn with_client(http_client: Client, url: impl Into<String>) -> Self {
        Self {
            http_client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Encode PCM bytes for the request body.
    ///
    /// The standard engine always pads to a multiple of four characters,
    /// which the Python decoder on the other side requires.
    pub(crate) fn encode_audio(audio: &[u8]) -> String {
        STANDARD.encode(audio)
    }
}

#[async_trait]
impl Transcriber for WhisperEmotionSTT {
    async fn transcribe(&self, audio: Bytes) -> Result<Transcription, STTError> {
        let encoded = Self::encode_audio(&audio);
        info!(
            audio_bytes = audio.len(),
            base64_len = encoded.len(),
            url = %self.url,
            "Sending utterance to transcription service"
        );

        let response = self
            .http_client
            .post(&self.url)
            .json(&TranscriptionRequest { audio: &encoded })
            .send()
            .await
            .map_err(|e| STTError::NetworkError(format!("Request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| STTError::NetworkError(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            // Prefer the service's own error description when it sent one
            let body = serde_json::from_str::<TranscriptionErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            warn!(status = status.as_u16(), "Transcription service returned an error: {}", body);
            return Err(STTError::ProviderError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranscriptionResponse = serde_json::from_str(&body)
            .map_err(|e| STTError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let transcription = Transcription::new(
            parsed.transcription.unwrap_or_default(),
            parsed
                .emotion
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_EMOTION.to_string()),
        );
        debug!(
            transcript = %transcription.transcript,
            emotion = %transcription.emotion,
            "Transcription received"
        );
        Ok(transcription)
    }

    fn provider_name(&self) -> &'static str {
        "whisper-emotion"
    }
}
