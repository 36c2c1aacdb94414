//! Speaker emotion labels.
//!
//! The transcription service returns an emotion label with every transcript.
//! The label is surfaced to the peer as-is and used to select the prompt
//! template for text generation (see [`crate::core::llm::prompts`]).

mod types;

pub use types::Emotion;
