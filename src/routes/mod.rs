use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub mod api;
pub mod voice;

/// Every route the server exposes, without state or outer layers
pub fn create_router() -> Router<Arc<AppState>> {
    api::create_api_router().merge(voice::create_voice_router())
}
