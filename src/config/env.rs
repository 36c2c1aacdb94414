use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::ServerConfig;
use crate::core::llm::DEFAULT_GEMINI_MODEL;
use crate::core::session::SessionConfig;
use crate::core::stt::DEFAULT_TRANSCRIPTION_URL;
use crate::core::tts::{DEFAULT_ELEVENLABS_MODEL_ID, DEFAULT_ELEVENLABS_VOICE_ID};
use crate::core::vad::VADConfig;

pub(super) const DEFAULT_HOST: &str = "0.0.0.0";
pub(super) const DEFAULT_PORT: u16 = 8080;
pub(super) const DEFAULT_UPSTREAM_TIMEOUT_SECONDS: u64 = 30;

/// Read a variable, treating empty values as unset
pub(super) fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a variable, falling back to `default` when unset
pub(super) fn env_parse<T>(name: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_string(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| format!("Invalid value for {name} ({raw:?}): {e}").into()),
        None => Ok(default),
    }
}

/// Build a configuration from environment variables and defaults.
///
/// `.env` files are loaded into the environment by `main` before this runs.
pub(super) fn load_env_config() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let defaults = SessionConfig::default();
    let vad_defaults = VADConfig::default();

    let vad = VADConfig {
        threshold: env_parse("SILENCE_VOLUME_THRESHOLD", vad_defaults.threshold)?,
        sample_rate: env_parse("AUDIO_SAMPLE_RATE", vad_defaults.sample_rate)?,
        sample_width: env_parse("AUDIO_SAMPLE_WIDTH", vad_defaults.sample_width)?,
        channels: env_parse("AUDIO_CHANNELS", vad_defaults.channels)?,
    };

    let session = SessionConfig {
        vad,
        utterance_boundary: Duration::from_millis(env_parse(
            "SILENCE_THRESHOLD_MS",
            defaults.utterance_boundary.as_millis() as u64,
        )?),
        call_end_delay: Duration::from_millis(env_parse(
            "CALL_END_SILENCE_MS",
            defaults.call_end_delay.as_millis() as u64,
        )?),
        min_utterance_secs: env_parse("MIN_AUDIO_DURATION_SECONDS", defaults.min_utterance_secs)?,
        expected_chunk_bytes: env_parse("AUDIO_CHUNK_BYTES", defaults.expected_chunk_bytes)?,
        error_cooldown: Duration::from_millis(env_parse(
            "ERROR_COOLDOWN_MS",
            defaults.error_cooldown.as_millis() as u64,
        )?),
        temperature: env_parse("GENERATION_TEMPERATURE", defaults.temperature)?,
    };

    Ok(ServerConfig {
        host: env_string("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: env_parse("PORT", DEFAULT_PORT)?,
        cors_allowed_origins: env_string("CORS_ALLOWED_ORIGINS"),
        transcription_url: env_string("TRANSCRIPTION_URL")
            .unwrap_or_else(|| DEFAULT_TRANSCRIPTION_URL.to_string()),
        upstream_timeout_seconds: env_parse(
            "UPSTREAM_TIMEOUT_SECONDS",
            DEFAULT_UPSTREAM_TIMEOUT_SECONDS,
        )?,
        gemini_api_key: env_string("GEMINI_API_KEY"),
        gemini_model: env_string("GEMINI_MODEL")
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        gemini_base_url: env_string("GEMINI_BASE_URL"),
        elevenlabs_api_key: env_string("ELEVENLABS_API_KEY"),
        elevenlabs_voice_id: env_string("ELEVENLABS_VOICE_ID")
            .unwrap_or_else(|| DEFAULT_ELEVENLABS_VOICE_ID.to_string()),
        elevenlabs_model_id: env_string("ELEVENLABS_MODEL_ID")
            .unwrap_or_else(|| DEFAULT_ELEVENLABS_MODEL_ID.to_string()),
        elevenlabs_base_url: env_string("ELEVENLABS_BASE_URL"),
        session,
    })
}
