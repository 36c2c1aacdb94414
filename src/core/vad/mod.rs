//! Voice Activity Detection (VAD) module
//!
//! This module provides the per-chunk loudness heuristic used to split the
//! caller's microphone stream into speech and silence. It is deliberately
//! cheap: one root-mean-square pass over the PCM samples of a chunk, compared
//! against a fixed volume threshold. There is no smoothing, no spectral
//! analysis and no learned model, so classification adds no latency.
//!
//! # Example
//!
//! ```rust
//! use voice_turn_gateway::core::vad::{ChunkClass, EnergyDetector, VADConfig, VoiceActivityDetector};
//!
//! let detector = EnergyDetector::new(&VADConfig::default());
//!
//! // 16-bit little-endian PCM, all zero samples
//! let silent = vec![0u8; 8192];
//! assert_eq!(detector.classify(&silent), ChunkClass::Silence);
//! ```

pub mod config;
pub mod detector;

pub use config::VADConfig;
pub use detector::{ChunkClass, EnergyDetector, VoiceActivityDetector, calculate_rms};
