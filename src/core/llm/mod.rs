//! Text generation: the [`TextGenerator`] seam, the Gemini client, the
//! emotion-aware prompt templates, and reply extraction.

mod base;
pub mod gemini;
pub mod prompts;
pub mod reply;

pub use base::{ConversationEntry, LLMError, Role, TextGenerator};
pub use gemini::{DEFAULT_GEMINI_MODEL, GEMINI_API_BASE_URL, GeminiClient};
pub use prompts::render_user_prompt;
pub use reply::{FALLBACK_REPLY, extract_direct_reply};
