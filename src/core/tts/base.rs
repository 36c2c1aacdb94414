use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use thiserror::Error;

/// Ordered stream of synthesized audio chunks
pub type AudioStream = BoxStream<'static, Result<Bytes, TTSError>>;

/// Errors that can occur during speech synthesis
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TTSError {
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("API returned status {status}: {body}")]
    ProviderError { status: u16, body: String },
    #[error("API key is missing a required permission: {0}")]
    PermissionDenied(String),
    #[error("Audio stream interrupted: {0}")]
    StreamError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Streaming speech-synthesis service.
///
/// The returned stream yields chunks in the order the provider emits them;
/// consumers forward them without reordering.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<AudioStream, TTSError>;

    fn provider_name(&self) -> &'static str;
}
