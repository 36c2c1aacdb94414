//! Voice WebSocket route configuration

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::voice::voice_handler;
use crate::state::AppState;
use std::sync::Arc;

/// Create the voice WebSocket router
///
/// # Endpoint
///
/// `GET /ws` - WebSocket upgrade for a voice session
///
/// # Example
///
/// ```text
/// // Client opens the call
/// start_audio_stream
///
/// // Client sends PCM chunks as binary frames; after a pause the server replies
/// {"type": "message", "text": "You: how are you"}
/// {"type": "emotion", "value": "happy"}
/// {"type": "message", "text": "Bot: I'm doing well, thanks!"}
/// // ...followed by binary frames of synthesized audio
/// ```
pub fn create_voice_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ws", get(voice_handler))
        .layer(TraceLayer::new_for_http())
}
