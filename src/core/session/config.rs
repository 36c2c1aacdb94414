use std::time::Duration;

use anyhow::{Result, bail};

use crate::core::vad::VADConfig;

/// Default silence needed to close an utterance
pub const DEFAULT_UTTERANCE_BOUNDARY: Duration = Duration::from_millis(1500);
/// Default continuous silence after which the server ends the call
pub const DEFAULT_CALL_END_DELAY: Duration = Duration::from_millis(10_000);
/// Default minimum utterance duration submitted for transcription
pub const DEFAULT_MIN_UTTERANCE_SECS: f32 = 1.0;
/// Chunk size the client is expected to send
pub const DEFAULT_EXPECTED_CHUNK_BYTES: usize = 8192;
/// Default cooldown between repeated failure notifications of one kind
pub const DEFAULT_ERROR_COOLDOWN: Duration = Duration::from_millis(5000);
/// Default generation temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Per-session tuning shared read-only by every connection
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Audio format and speech threshold
    pub vad: VADConfig,
    /// Silence that closes an utterance
    pub utterance_boundary: Duration,
    /// Silence that ends the call
    pub call_end_delay: Duration,
    /// Utterances shorter than this are discarded
    pub min_utterance_secs: f32,
    /// Expected size of one client chunk, used to derive the minimum chunk count
    pub expected_chunk_bytes: usize,
    /// Cooldown between failure notifications of the same kind
    pub error_cooldown: Duration,
    /// Sampling temperature for reply generation
    pub temperature: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            vad: VADConfig::default(),
            utterance_boundary: DEFAULT_UTTERANCE_BOUNDARY,
            call_end_delay: DEFAULT_CALL_END_DELAY,
            min_utterance_secs: DEFAULT_MIN_UTTERANCE_SECS,
            expected_chunk_bytes: DEFAULT_EXPECTED_CHUNK_BYTES,
            error_cooldown: DEFAULT_ERROR_COOLDOWN,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl SessionConfig {
    /// Byte floor below which an utterance is never transcribed
    pub fn min_utterance_bytes(&self) -> usize {
        (self.min_utterance_secs as f64 * self.vad.bytes_per_second() as f64).round() as usize
    }

    /// Buffered chunk count required before a boundary may flush
    pub fn min_chunks(&self) -> usize {
        let chunk = self.expected_chunk_bytes.max(1);
        self.min_utterance_bytes().div_ceil(chunk).max(1)
    }

    pub fn validate(&self) -> Result<()> {
        self.vad.validate()?;
        if self.utterance_boundary.is_zero() {
            bail!("utterance boundary must be greater than zero");
        }
        if self.call_end_delay <= self.utterance_boundary {
            bail!(
                "call end delay ({:?}) must be longer than the utterance boundary ({:?})",
                self.call_end_delay,
                self.utterance_boundary
            );
        }
        if !self.min_utterance_secs.is_finite() || self.min_utterance_secs < 0.0 {
            bail!("minimum utterance duration must be a non-negative number of seconds");
        }
        if self.expected_chunk_bytes == 0 {
            bail!("expected chunk size must be greater than zero");
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            bail!("temperature must be between 0.0 and 2.0, got {}", self.temperature);
        }
        Ok(())
    }
}
