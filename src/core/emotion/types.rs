//! Emotion labels reported by the transcription service.
//!
//! The transcription service classifies the speaker's emotion alongside the
//! transcript. Labels arrive as free-form lowercase strings; this module
//! normalizes the known ones so the prompt layer can pick a matching template.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Emotions the speech emotion classifier can report.
///
/// # Example
///
/// ```rust
/// use voice_turn_gateway::core::emotion::Emotion;
///
/// assert_eq!(Emotion::parse("Happy"), Some(Emotion::Happy));
/// assert_eq!(Emotion::parse("disgusted"), Some(Emotion::Disgust));
/// assert_eq!(Emotion::parse("bewildered"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    /// Neutral, default emotional state
    #[default]
    Neutral,
    /// Calm, relaxed
    Calm,
    /// Happy, joyful
    Happy,
    /// Sad, sorrowful
    Sad,
    /// Angry, frustrated
    Angry,
    /// Fearful, anxious
    Fearful,
    /// Disgusted, repulsed
    Disgust,
    /// Surprised, astonished
    Surprised,
}

impl Emotion {
    /// Returns all labels the classifier can produce.
    #[inline]
    pub const fn all() -> &'static [Emotion] {
        &[
            Emotion::Neutral,
            Emotion::Calm,
            Emotion::Happy,
            Emotion::Sad,
            Emotion::Angry,
            Emotion::Fearful,
            Emotion::Disgust,
            Emotion::Surprised,
        ]
    }

    /// Canonical lowercase label
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Calm => "calm",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Fearful => "fearful",
            Emotion::Disgust => "disgust",
            Emotion::Surprised => "surprised",
        }
    }

    /// Parse a label (case-insensitive, common aliases accepted).
    ///
    /// Returns `None` for unrecognized labels such as `"unknown"`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "neutral" => Some(Emotion::Neutral),
            "calm" | "relaxed" | "peaceful" => Some(Emotion::Calm),
            "happy" | "joy" | "joyful" | "cheerful" => Some(Emotion::Happy),
            "sad" | "sadness" | "sorrowful" => Some(Emotion::Sad),
            "angry" | "anger" | "frustrated" => Some(Emotion::Angry),
            "fearful" | "fear" | "scared" | "afraid" => Some(Emotion::Fearful),
            "disgust" | "disgusted" => Some(Emotion::Disgust),
            "surprised" | "surprise" | "shocked" => Some(Emotion::Surprised),
            _ => None,
        }
    }

    /// Parse a label, falling back to [`Emotion::Neutral`] when unrecognized
    pub fn parse_or_neutral(label: &str) -> Self {
        Self::parse(label).unwrap_or_default()
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
