use super::ServerConfig;

/// Validate an upstream URL
pub(super) fn validate_url(name: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(format!("{name} must start with http:// or https://, got {value:?}").into());
    }
    Ok(())
}

/// Validate the merged configuration
pub(super) fn validate_server_config(
    config: &ServerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.port == 0 {
        return Err("PORT must be greater than 0".into());
    }
    validate_url("TRANSCRIPTION_URL", &config.transcription_url)?;
    if let Some(url) = &config.gemini_base_url {
        validate_url("GEMINI_BASE_URL", url)?;
    }
    if let Some(url) = &config.elevenlabs_base_url {
        validate_url("ELEVENLABS_BASE_URL", url)?;
    }
    if config.upstream_timeout_seconds == 0 {
        return Err("UPSTREAM_TIMEOUT_SECONDS must be greater than 0".into());
    }
    if config.gemini_model.trim().is_empty() {
        return Err("GEMINI_MODEL must not be empty".into());
    }
    if config.elevenlabs_voice_id.trim().is_empty() {
        return Err("ELEVENLABS_VOICE_ID must not be empty".into());
    }
    config
        .session
        .validate()
        .map_err(|e| format!("Invalid session configuration: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("X", "http://localhost:5001/x").is_ok());
        assert!(validate_url("X", "https://api.example.com").is_ok());
        let err = validate_url("X", "localhost:5001").unwrap_err();
        assert!(err.to_string().contains("X must start with"));
    }
}
