use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Speaker of a conversation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry of the ordered conversation transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub role: Role,
    pub text: String,
}

impl ConversationEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Errors that can occur while generating a reply
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LLMError {
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("API returned status {status}: {body}")]
    ProviderError { status: u16, body: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Generation returned no text")]
    EmptyResponse,
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Text-generation service.
///
/// `history` is the full conversation so far, ending with the user entry for
/// the current turn.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        history: &[ConversationEntry],
        temperature: f32,
    ) -> Result<String, LLMError>;

    fn provider_name(&self) -> &'static str;
}
