//! ElevenLabs streaming TTS.
//!
//! # API Reference
//!
//! - Endpoint: `POST https://api.elevenlabs.io/v1/text-to-speech/{voice_id}/stream`
//! - Auth: `xi-api-key` header
//! - Body: `{"text": "...", "model_id": "..."}`
//! - Output: chunked binary audio, forwarded as it arrives

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::core::tts::base::{AudioStream, SpeechSynthesizer, TTSError};

/// ElevenLabs API root
pub const ELEVENLABS_API_BASE_URL: &str = "https://api.elevenlabs.io";

/// Default voice ("Rachel")
pub const DEFAULT_ELEVENLABS_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// Default model, tuned for conversational latency
pub const DEFAULT_ELEVENLABS_MODEL_ID: &str = "eleven_turbo_v2_5";

/// Marker ElevenLabs puts in error bodies for keys lacking the TTS scope
const MISSING_PERMISSION_MARKER: &str = "missing the permission";

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// ElevenLabs streaming synthesizer
#[derive(Clone)]
pub struct ElevenLabsTTS {
    http_client: Client,
    api_key: String,
    voice_id: String,
    model_id: String,
    base_url: String,
}

impl std::fmt::Debug for ElevenLabsTTS {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsTTS")
            .field("voice_id", &self.voice_id)
            .field("model_id", &self.model_id)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Drop for ElevenLabsTTS {
    fn drop(&mut self) {
        self.api_key.zeroize();
    }
}

impl ElevenLabsTTS {
    pub fn new(
        api_key: impl Into<String>,
        voice_id: impl Into<String>,
        model_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TTSError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(TTSError::ConfigurationError(
                "ElevenLabs API key is empty".to_string(),
            ));
        }
        // The timeout covers connecting and the response headers only; a
        // long reply may legitimately stream for longer.
        let http_client = Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| TTSError::ConfigurationError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            api_key,
            voice_id: voice_id.into(),
            model_id: model_id.into(),
            base_url: ELEVENLABS_API_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn voice_id(&self) -> &str {
        &self.voice_id
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/text-to-speech/{}/stream",
            self.base_url, self.voice_id
        )
    }
}

/// Map a non-2xx response to a [`TTSError`]
fn classify_error(status: u16, body: String) -> TTSError {
    if body.contains(MISSING_PERMISSION_MARKER) {
        TTSError::PermissionDenied(body)
    } else {
        TTSError::ProviderError { status, body }
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsTTS {
    async fn synthesize(&self, text: &str) -> Result<AudioStream, TTSError> {
        debug!(
            voice_id = %self.voice_id,
            model_id = %self.model_id,
            chars = text.len(),
            "Requesting ElevenLabs synthesis"
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .header("xi-api-key", &self.api_key)
            .json(&SynthesisRequest {
                text,
                model_id: &self.model_id,
            })
            .send()
            .await
            .map_err(|e| TTSError::NetworkError(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "ElevenLabs returned an error: {}", body);
            return Err(classify_error(status.as_u16(), body));
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| TTSError::StreamError(e.to_string())))
            .filter(|chunk| {
                let keep = !matches!(chunk, Ok(bytes) if bytes.is_empty());
                async move { keep }
            });
        Ok(stream.boxed())
    }

    fn provider_name(&self) -> &'static str {
        "elevenlabs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_uses_voice_id() {
        let tts = ElevenLabsTTS::new(
            "key",
            DEFAULT_ELEVENLABS_VOICE_ID,
            DEFAULT_ELEVENLABS_MODEL_ID,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            tts.endpoint(),
            "https://api.elevenlabs.io/v1/text-to-speech/21m00Tcm4TlvDq8ikWAM/stream"
        );
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let err = ElevenLabsTTS::new("", "v", "m", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, TTSError::ConfigurationError(_)));
    }

    #[test]
    fn test_permission_errors_are_classified() {
        let body = r#"{"detail":{"status":"missing_permissions","message":"The API key you used is missing the permission text_to_speech"}}"#;
        assert!(matches!(
            classify_error(401, body.to_string()),
            TTSError::PermissionDenied(_)
        ));
        assert!(matches!(
            classify_error(500, "boom".to_string()),
            TTSError::ProviderError { status: 500, .. }
        ));
    }
}
