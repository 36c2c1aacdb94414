//! Audio Test Fixtures
//!
//! Chunks are generated, not loaded from disk, so every test controls the
//! exact RMS the detector sees.
//!
//! Audio format (the gateway default):
//! - Sample rate: 48kHz
//! - Bit depth: 16-bit signed PCM, little-endian
//! - Channels: Mono

use bytes::Bytes;

/// Bytes in one client chunk (4096 samples, ~85ms at 48kHz)
pub const CHUNK_BYTES: usize = 8192;

/// Amplitude of generated speech; far above the default threshold of 70
pub const SPEECH_AMPLITUDE: i16 = 1000;

/// Convert samples to little-endian bytes
pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Square wave at `amplitude`; its RMS equals `amplitude`
pub fn generate_square_wave(num_samples: usize, amplitude: i16) -> Vec<i16> {
    (0..num_samples)
        .map(|i| if (i / 24) % 2 == 0 { amplitude } else { -amplitude })
        .collect()
}

/// One loud chunk of `bytes` length
pub fn speech_chunk_sized(bytes: usize) -> Bytes {
    Bytes::from(samples_to_bytes(&generate_square_wave(
        bytes / 2,
        SPEECH_AMPLITUDE,
    )))
}

/// One full-size loud chunk
pub fn speech_chunk() -> Bytes {
    speech_chunk_sized(CHUNK_BYTES)
}

/// One full-size chunk of digital silence
pub fn silence_chunk() -> Bytes {
    Bytes::from(vec![0u8; CHUNK_BYTES])
}

/// Quiet background noise that stays below the default threshold
pub fn quiet_chunk() -> Bytes {
    Bytes::from(samples_to_bytes(&generate_square_wave(CHUNK_BYTES / 2, 20)))
}

