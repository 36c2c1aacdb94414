use std::time::Duration;

use super::ServerConfig;
use super::env::load_env_config;
use super::yaml::YamlConfig;

/// Merge environment configuration (base) with YAML overrides.
///
/// Every value present in the YAML file replaces the environment value; absent
/// values keep whatever the environment or the defaults provided.
pub(super) fn merge_config(
    yaml: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = load_env_config()?;
    let Some(yaml) = yaml else {
        return Ok(config);
    };

    if let Some(server) = yaml.server {
        if let Some(host) = server.host {
            config.host = host;
        }
        if let Some(port) = server.port {
            config.port = port;
        }
        if let Some(origins) = server.cors_allowed_origins {
            config.cors_allowed_origins = Some(origins);
        }
    }

    if let Some(providers) = yaml.providers {
        if let Some(url) = providers.transcription_url {
            config.transcription_url = url;
        }
        if let Some(timeout) = providers.timeout_seconds {
            config.upstream_timeout_seconds = timeout;
        }
        if let Some(key) = providers.gemini_api_key {
            config.gemini_api_key = Some(key);
        }
        if let Some(model) = providers.gemini_model {
            config.gemini_model = model;
        }
        if let Some(url) = providers.gemini_base_url {
            config.gemini_base_url = Some(url);
        }
        if let Some(key) = providers.elevenlabs_api_key {
            config.elevenlabs_api_key = Some(key);
        }
        if let Some(voice) = providers.elevenlabs_voice_id {
            config.elevenlabs_voice_id = voice;
        }
        if let Some(model) = providers.elevenlabs_model_id {
            config.elevenlabs_model_id = model;
        }
        if let Some(url) = providers.elevenlabs_base_url {
            config.elevenlabs_base_url = Some(url);
        }
    }

    if let Some(audio) = yaml.audio {
        let vad = &mut config.session.vad;
        if let Some(threshold) = audio.volume_threshold {
            vad.threshold = threshold;
        }
        if let Some(rate) = audio.sample_rate {
            vad.sample_rate = rate;
        }
        if let Some(width) = audio.sample_width {
            vad.sample_width = width;
        }
        if let Some(channels) = audio.channels {
            vad.channels = channels;
        }
        if let Some(chunk) = audio.chunk_bytes {
            config.session.expected_chunk_bytes = chunk;
        }
    }

    if let Some(turn) = yaml.turn {
        let session = &mut config.session;
        if let Some(ms) = turn.silence_threshold_ms {
            session.utterance_boundary = Duration::from_millis(ms);
        }
        if let Some(ms) = turn.call_end_silence_ms {
            session.call_end_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = turn.min_audio_duration_seconds {
            session.min_utterance_secs = secs;
        }
        if let Some(ms) = turn.error_cooldown_ms {
            session.error_cooldown = Duration::from_millis(ms);
        }
        if let Some(temperature) = turn.temperature {
            session.temperature = temperature;
        }
    }

    Ok(config)
}
