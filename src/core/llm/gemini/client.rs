use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use zeroize::Zeroize;

use super::messages::{GeminiErrorResponse, GenerateContentRequest, GenerateContentResponse};
use crate::core::llm::base::{ConversationEntry, LLMError, TextGenerator};

/// Gemini REST API base URL
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Gemini `generateContent` client
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Drop for GeminiClient {
    fn drop(&mut self) {
        self.api_key.zeroize();
    }
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LLMError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LLMError::ConfigurationError(
                "Gemini API key is empty".to_string(),
            ));
        }
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LLMError::ConfigurationError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            api_key,
            model: model.into(),
            base_url: GEMINI_API_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different API root (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        history: &[ConversationEntry],
        temperature: f32,
    ) -> Result<String, LLMError> {
        let request = GenerateContentRequest::new(history, temperature);
        debug!(
            model = %self.model,
            turns = history.len(),
            temperature,
            "Sending generateContent request"
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(format!("Request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LLMError::NetworkError(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let body = serde_json::from_str::<GeminiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!(status = status.as_u16(), "Gemini returned an error: {}", body);
            return Err(LLMError::ProviderError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| LLMError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        match parsed.text() {
            Some(text) if !text.trim().is_empty() => {
                debug!(chars = text.len(), "Received generation output");
                Ok(text)
            }
            _ => Err(LLMError::EmptyResponse),
        }
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}
