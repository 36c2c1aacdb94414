pub mod emotion;
pub mod llm;
pub mod session;
pub mod stt;
pub mod tts;
pub mod turn;
pub mod vad;

// Re-export commonly used types for convenience
pub use emotion::Emotion;
pub use llm::{ConversationEntry, GeminiClient, LLMError, Role, TextGenerator};
pub use session::{BoundaryState, Session, SessionConfig};
pub use stt::{STTError, Transcriber, Transcription, WhisperEmotionSTT};
pub use tts::{AudioStream, ElevenLabsTTS, SpeechSynthesizer, TTSError};
pub use turn::{
    Capability, FailureKind, TurnEvent, TurnInput, TurnOrchestrator, TurnOutcome, TurnServices,
    TurnUpdate,
};
pub use vad::{ChunkClass, EnergyDetector, VADConfig, VoiceActivityDetector, calculate_rms};
