//! HTTP and WebSocket request handlers
//!
//! This module organizes all handlers into logical groups:
//! - `api` - Health check endpoint
//! - `voice` - WebSocket voice sessions (segmentation and turn-taking)

pub mod api;
pub mod voice;

// Re-export commonly used handlers for convenient access
pub use voice::voice_handler;
