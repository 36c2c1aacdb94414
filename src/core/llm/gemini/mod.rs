//! Google Gemini text generation.

mod client;
pub mod messages;

pub use client::{DEFAULT_GEMINI_MODEL, GEMINI_API_BASE_URL, GeminiClient};
