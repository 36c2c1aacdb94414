//! VAD configuration types

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Sample widths (bytes per sample) the detector knows how to decode
pub const SUPPORTED_SAMPLE_WIDTHS: [usize; 3] = [1, 2, 4];

/// Configuration for Voice Activity Detection
///
/// The audio format fields describe the fixed PCM format agreed with the
/// caller out of band. Nothing here resamples or transcodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VADConfig {
    /// RMS volume below which a chunk is classified as silence.
    /// Expressed on the raw sample scale (e.g. 0..32767 for 16-bit PCM),
    /// tune it to the microphone noise floor (typically 50-200).
    pub threshold: f32,

    /// Sample rate of the incoming audio (Hz)
    pub sample_rate: u32,

    /// Bytes per sample (1, 2 or 4)
    pub sample_width: usize,

    /// Number of interleaved channels
    pub channels: u16,
}

impl Default for VADConfig {
    fn default() -> Self {
        Self {
            threshold: 70.0,
            sample_rate: 48000,
            sample_width: 2,
            channels: 1,
        }
    }
}

impl VADConfig {
    /// Create a new VADConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes one second of audio occupies in this format
    pub fn bytes_per_second(&self) -> usize {
        self.sample_rate as usize * self.sample_width * self.channels as usize
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            anyhow::bail!("VAD threshold must be a non-negative number");
        }
        if self.sample_rate == 0 {
            anyhow::bail!("VAD sample_rate must be greater than 0");
        }
        if self.channels == 0 {
            anyhow::bail!("VAD channels must be greater than 0");
        }
        if !SUPPORTED_SAMPLE_WIDTHS.contains(&self.sample_width) {
            anyhow::bail!(
                "VAD sample_width must be one of {:?} bytes, got {}",
                SUPPORTED_SAMPLE_WIDTHS,
                self.sample_width
            );
        }
        Ok(())
    }
}
