use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present in
/// the file override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 8080
///   cors_allowed_origins: "*"
///
/// providers:
///   transcription_url: "http://localhost:5001/transcribe_and_emotion"
///   timeout_seconds: 30
///   gemini_api_key: "your-gemini-key"
///   gemini_model: "gemini-1.5-flash"
///   elevenlabs_api_key: "your-elevenlabs-key"
///   elevenlabs_voice_id: "21m00Tcm4TlvDq8ikWAM"
///   elevenlabs_model_id: "eleven_turbo_v2_5"
///
/// audio:
///   volume_threshold: 70.0
///   sample_rate: 48000
///   sample_width: 2
///   channels: 1
///   chunk_bytes: 8192
///
/// turn:
///   silence_threshold_ms: 1500
///   call_end_silence_ms: 10000
///   min_audio_duration_seconds: 1.0
///   error_cooldown_ms: 5000
///   temperature: 0.5
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub providers: Option<ProvidersYaml>,
    pub audio: Option<AudioYaml>,
    pub turn: Option<TurnYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Comma-separated list of origins, or "*"
    pub cors_allowed_origins: Option<String>,
}

/// Upstream service endpoints and credentials from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProvidersYaml {
    pub transcription_url: Option<String>,
    /// Timeout applied to upstream HTTP calls
    pub timeout_seconds: Option<u64>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub gemini_base_url: Option<String>,
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_voice_id: Option<String>,
    pub elevenlabs_model_id: Option<String>,
    pub elevenlabs_base_url: Option<String>,
}

/// Inbound audio format and speech threshold from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AudioYaml {
    /// RMS below which a chunk counts as silence
    pub volume_threshold: Option<f32>,
    pub sample_rate: Option<u32>,
    /// Bytes per sample (1, 2 or 4)
    pub sample_width: Option<usize>,
    pub channels: Option<u16>,
    /// Expected size of one client chunk
    pub chunk_bytes: Option<usize>,
}

/// Turn-taking timings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TurnYaml {
    pub silence_threshold_ms: Option<u64>,
    pub call_end_silence_ms: Option<u64>,
    pub min_audio_duration_seconds: Option<f32>,
    pub error_cooldown_ms: Option<u64>,
    pub temperature: Option<f32>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Required fields have invalid types
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}
