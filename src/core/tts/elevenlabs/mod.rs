mod provider;

pub use provider::{
    DEFAULT_ELEVENLABS_MODEL_ID, DEFAULT_ELEVENLABS_VOICE_ID, ELEVENLABS_API_BASE_URL,
    ElevenLabsTTS,
};
