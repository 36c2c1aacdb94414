//! RMS energy detector

use super::config::VADConfig;

/// Classification of a single audio chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkClass {
    /// Loudness at or above the volume threshold
    Speech,
    /// Loudness below the volume threshold
    Silence,
}

/// Trait for Voice Activity Detection implementations
pub trait VoiceActivityDetector: Send + Sync {
    /// Loudness estimate for one chunk
    fn level(&self, chunk: &[u8]) -> f32;

    /// Classify one chunk as speech or silence
    fn classify(&self, chunk: &[u8]) -> ChunkClass;

    /// Get the configuration
    fn config(&self) -> &VADConfig;
}

/// Calculate the RMS (Root Mean Square) of the signed samples in `audio`.
///
/// Samples are little-endian and interpreted on their native width:
/// 1 byte is unsigned 8-bit PCM centred at 128, 2 bytes is `i16`,
/// 4 bytes is `i32`. A misaligned tail is truncated to the largest aligned
/// prefix. Returns 0.0 when no complete sample remains or the width is not
/// supported.
pub fn calculate_rms(audio: &[u8], sample_width: usize) -> f32 {
    if sample_width == 0 {
        return 0.0;
    }

    let sample_count = audio.len() / sample_width;
    if sample_count == 0 {
        return 0.0;
    }

    let aligned = &audio[..sample_count * sample_width];
    let sum_squares: f64 = match sample_width {
        1 => aligned
            .iter()
            .map(|&b| {
                let s = b as f64 - 128.0;
                s * s
            })
            .sum(),
        2 => aligned
            .chunks_exact(2)
            .map(|c| {
                let s = i16::from_le_bytes([c[0], c[1]]) as f64;
                s * s
            })
            .sum(),
        4 => aligned
            .chunks_exact(4)
            .map(|c| {
                let s = i32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64;
                s * s
            })
            .sum(),
        _ => return 0.0,
    };

    (sum_squares / sample_count as f64).sqrt() as f32
}

/// Energy-based detector: RMS compared against a fixed threshold
#[derive(Debug, Clone)]
pub struct EnergyDetector {
    config: VADConfig,
}

impl EnergyDetector {
    pub fn new(config: &VADConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl VoiceActivityDetector for EnergyDetector {
    fn level(&self, chunk: &[u8]) -> f32 {
        calculate_rms(chunk, self.config.sample_width)
    }

    fn classify(&self, chunk: &[u8]) -> ChunkClass {
        if self.level(chunk) < self.config.threshold {
            ChunkClass::Silence
        } else {
            ChunkClass::Speech
        }
    }

    fn config(&self) -> &VADConfig {
        &self.config
    }
}
