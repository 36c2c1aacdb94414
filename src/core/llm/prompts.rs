//! Emotion-aware prompt templates.
//!
//! Each user turn is wrapped in a template before it is sent to the
//! generation service. The template carries the user's words, the detected
//! emotion, and a tone hint selected by emotion label. Unknown labels fall
//! back to the neutral hint.

use phf::phf_map;

use crate::core::emotion::Emotion;

/// Tone hint for labels missing from [`TONE_HINTS`]
pub const NEUTRAL_TONE: &str = "Respond in a friendly, natural tone.";

/// Tone hints keyed by lowercase emotion label
static TONE_HINTS: phf::Map<&'static str, &'static str> = phf_map! {
    "neutral" => NEUTRAL_TONE,
    "calm" => "Match the user's relaxed pace and keep the reply gentle.",
    "happy" => "Share the user's good mood and keep the reply upbeat.",
    "sad" => "Be warm and supportive. Acknowledge how the user feels before anything else.",
    "angry" => "Stay calm and respectful. Acknowledge the frustration without being defensive.",
    "fearful" => "Be reassuring and steady. Offer comfort and keep the reply simple.",
    "disgust" => "Stay understanding and non-judgmental. Acknowledge the user's reaction.",
    "surprised" => "Respond with curiosity and engage with what surprised the user.",
};

/// Tone hint for an emotion label (case-insensitive, aliases resolved,
/// neutral on miss)
pub fn tone_hint(emotion: &str) -> &'static str {
    Emotion::parse(emotion)
        .and_then(|e| TONE_HINTS.get(e.as_str()).copied())
        .unwrap_or(NEUTRAL_TONE)
}

/// Render the generation prompt for one user utterance
pub fn render_user_prompt(text: &str, emotion: &str) -> String {
    let label = match emotion.trim() {
        "" => "neutral".to_string(),
        e => e.to_ascii_lowercase(),
    };
    format!(
        "User's input (emotion: {label}): \"{text}\"\n\n\
         As a conversational AI, provide a single, direct, and empathetic response to the user \
         based on their input and emotion. {hint} Do not offer multiple options or analyze the \
         input. Just give a direct conversational reply.",
        hint = tone_hint(emotion),
    )
}
