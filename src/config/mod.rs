//! Configuration module for the voice turn gateway
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use voice_turn_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::core::session::SessionConfig;

mod env;
mod merge;
mod validation;
mod yaml;

/// Server configuration
///
/// Contains everything needed to run the gateway:
/// - Server settings (host, port, CORS)
/// - Upstream endpoints and credentials (transcription, Gemini, ElevenLabs)
/// - Per-session audio and turn-taking settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,

    // Upstreams
    /// Whisper + emotion transcription endpoint
    pub transcription_url: String,
    /// Timeout for upstream HTTP calls
    pub upstream_timeout_seconds: u64,
    /// Gemini API key; generation is disabled without it
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// Override for the Gemini API root
    pub gemini_base_url: Option<String>,
    /// ElevenLabs API key; synthesis is disabled without it
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_voice_id: String,
    pub elevenlabs_model_id: String,
    /// Override for the ElevenLabs API root
    pub elevenlabs_base_url: Option<String>,

    /// Audio format and turn-taking settings shared by every session
    pub session: SessionConfig,
}

/// Implement Drop to zeroize all secret fields when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.gemini_api_key {
            key.zeroize();
        }
        if let Some(ref mut key) = self.elevenlabs_api_key {
            key.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables (and defaults)
    ///
    /// # Errors
    /// Returns an error if a variable has an invalid format or validation fails.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge::merge_config(None)?;
        validation::validate_server_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// After loading and merging, performs validation on the final configuration.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        // Note: .env file is loaded in main.rs at application startup
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate_server_config(&config)?;
        Ok(config)
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds)
    }

    /// Whether reply generation is configured
    pub fn has_generation(&self) -> bool {
        self.gemini_api_key.is_some()
    }

    /// Whether speech synthesis is configured
    pub fn has_synthesis(&self) -> bool {
        self.elevenlabs_api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    const ENV_VARS: &[&str] = &[
        "HOST",
        "PORT",
        "CORS_ALLOWED_ORIGINS",
        "TRANSCRIPTION_URL",
        "UPSTREAM_TIMEOUT_SECONDS",
        "GEMINI_API_KEY",
        "GEMINI_MODEL",
        "GEMINI_BASE_URL",
        "ELEVENLABS_API_KEY",
        "ELEVENLABS_VOICE_ID",
        "ELEVENLABS_MODEL_ID",
        "ELEVENLABS_BASE_URL",
        "SILENCE_VOLUME_THRESHOLD",
        "SILENCE_THRESHOLD_MS",
        "CALL_END_SILENCE_MS",
        "MIN_AUDIO_DURATION_SECONDS",
        "AUDIO_SAMPLE_RATE",
        "AUDIO_SAMPLE_WIDTH",
        "AUDIO_CHANNELS",
        "AUDIO_CHUNK_BYTES",
        "ERROR_COOLDOWN_MS",
        "GENERATION_TEMPERATURE",
    ];

    fn cleanup_env_vars() {
        unsafe {
            for name in ENV_VARS {
                env::remove_var(name);
            }
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        cleanup_env_vars();

        let config = ServerConfig::from_env().unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.transcription_url,
            "http://localhost:5001/transcribe_and_emotion"
        );
        assert_eq!(config.gemini_model, "gemini-1.5-flash");
        assert_eq!(config.elevenlabs_voice_id, "21m00Tcm4TlvDq8ikWAM");
        assert_eq!(config.elevenlabs_model_id, "eleven_turbo_v2_5");
        assert!(!config.has_generation());
        assert!(!config.has_synthesis());
        assert_eq!(config.session, SessionConfig::default());

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        cleanup_env_vars();
        unsafe {
            env::set_var("PORT", "3001");
            env::set_var("GEMINI_API_KEY", "env-gemini");
            env::set_var("SILENCE_VOLUME_THRESHOLD", "150");
            env::set_var("SILENCE_THRESHOLD_MS", "800");
            env::set_var("GENERATION_TEMPERATURE", "0.2");
        }

        let config = ServerConfig::from_env().unwrap();

        assert_eq!(config.port, 3001);
        assert_eq!(config.gemini_api_key, Some("env-gemini".to_string()));
        assert_eq!(config.session.vad.threshold, 150.0);
        assert_eq!(config.session.utterance_boundary, Duration::from_millis(800));
        assert_eq!(config.session.temperature, 0.2);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_empty_key_is_unset() {
        cleanup_env_vars();
        unsafe {
            env::set_var("ELEVENLABS_API_KEY", "  ");
        }

        let config = ServerConfig::from_env().unwrap();
        assert!(!config.has_synthesis());

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_number() {
        cleanup_env_vars();
        unsafe {
            env::set_var("PORT", "not-a-port");
        }

        let err = ServerConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("Invalid value for PORT"));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_transcription_url() {
        cleanup_env_vars();
        unsafe {
            env::set_var("TRANSCRIPTION_URL", "localhost:5001");
        }

        assert!(ServerConfig::from_env().is_err());

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_yaml_overrides_env() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let yaml_content = r#"
server:
  host: "127.0.0.1"
  port: 9000

providers:
  gemini_api_key: "yaml-key"

turn:
  call_end_silence_ms: 30000
"#;
        fs::write(&config_path, yaml_content).unwrap();

        unsafe {
            env::set_var("HOST", "10.0.0.1");
            env::set_var("GEMINI_API_KEY", "env-key");
            env::set_var("ELEVENLABS_API_KEY", "env-el-key");
        }

        let config = ServerConfig::from_file(&config_path).unwrap();

        // YAML overrides ENV
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.gemini_api_key, Some("yaml-key".to_string()));
        // ENV fills what YAML leaves out
        assert_eq!(config.elevenlabs_api_key, Some("env-el-key".to_string()));
        assert_eq!(config.port, 9000);
        assert_eq!(config.session.call_end_delay, Duration::from_secs(30));
        assert_eq!(config.address(), "127.0.0.1:9000");

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_audio_section() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(
            &config_path,
            "audio:\n  sample_rate: 16000\n  chunk_bytes: 4096\n",
        )
        .unwrap();

        let config = ServerConfig::from_file(&config_path).unwrap();

        assert_eq!(config.session.vad.sample_rate, 16000);
        assert_eq!(config.session.expected_chunk_bytes, 4096);
        // 1s at 16 kHz, 16-bit mono
        assert_eq!(config.session.min_utterance_bytes(), 32_000);
        assert_eq!(config.session.min_chunks(), 8);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_invalid_session_values() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "audio:\n  sample_width: 3\n").unwrap();

        let err = ServerConfig::from_file(&config_path).unwrap_err();
        assert!(err.to_string().contains("Invalid session configuration"));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_missing_file() {
        cleanup_env_vars();

        let result = ServerConfig::from_file(&PathBuf::from("/nonexistent/config.yaml"));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
