use std::sync::Arc;

use reqwest::Client;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::core::llm::{GeminiClient, TextGenerator};
use crate::core::session::SessionConfig;
use crate::core::stt::{Transcriber, WhisperEmotionSTT};
use crate::core::tts::{ElevenLabsTTS, SpeechSynthesizer};
use crate::core::turn::TurnServices;

/// Application state shared by every connection
pub struct AppState {
    pub config: ServerConfig,
    /// Session settings handed to each new connection
    pub session_config: Arc<SessionConfig>,
    /// Upstream clients, shared read-only
    pub services: Arc<TurnServices>,
}

impl AppState {
    /// Build the upstream clients from configuration.
    ///
    /// Missing generation or synthesis credentials are not fatal: the
    /// corresponding service is left out and sessions report it to the peer.
    pub async fn new(config: ServerConfig) -> Arc<Self> {
        let timeout = config.upstream_timeout();

        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout, using defaults: {}", e);
                Client::new()
            });
        let transcriber: Arc<dyn Transcriber> = Arc::new(WhisperEmotionSTT::with_client(
            http_client,
            config.transcription_url.clone(),
        ));
        let mut services = TurnServices::new(transcriber);

        match config.gemini_api_key.as_deref() {
            Some(key) => match GeminiClient::new(key, config.gemini_model.clone(), timeout) {
                Ok(client) => {
                    let client = match &config.gemini_base_url {
                        Some(url) => client.with_base_url(url.clone()),
                        None => client,
                    };
                    let generator: Arc<dyn TextGenerator> = Arc::new(client);
                    services = services.with_generator(generator);
                }
                Err(e) => warn!("Gemini client unavailable: {}", e),
            },
            None => warn!("GEMINI_API_KEY is not set. Reply generation is disabled."),
        }

        match config.elevenlabs_api_key.as_deref() {
            Some(key) => match ElevenLabsTTS::new(
                key,
                config.elevenlabs_voice_id.clone(),
                config.elevenlabs_model_id.clone(),
                timeout,
            ) {
                Ok(tts) => {
                    let tts = match &config.elevenlabs_base_url {
                        Some(url) => tts.with_base_url(url.clone()),
                        None => tts,
                    };
                    let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(tts);
                    services = services.with_synthesizer(synthesizer);
                }
                Err(e) => warn!("ElevenLabs client unavailable: {}", e),
            },
            None => warn!("ELEVENLABS_API_KEY is not set. Speech synthesis is disabled."),
        }

        info!(services = ?services, "Upstream services configured");
        Self::with_services(config, services)
    }

    /// Build state around already constructed services
    pub fn with_services(config: ServerConfig, services: TurnServices) -> Arc<Self> {
        Arc::new(Self {
            session_config: Arc::new(config.session.clone()),
            services: Arc::new(services),
            config,
        })
    }
}
