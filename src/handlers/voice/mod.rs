//! Voice WebSocket handlers
//!
//! # Protocol
//!
//! ## Client → Server
//!
//! - **Binary frames**: PCM audio chunks (16-bit signed LE, mono)
//! - **`start_audio_stream`**: start a fresh call
//! - **`stop_audio_stream`**: end the call, transcribing what is buffered
//! - **Any other text**: an utterance typed by the user
//!
//! ## Server → Client
//!
//! - **message**: chat line (`You:`, `Bot:`, `Server:`)
//! - **emotion**: emotion detected in the last utterance
//! - **error**: upstream failure notice
//! - **call_ended_by_server**: the call ended (`manual_stop`, `prolonged_silence`)
//! - **Binary frames**: synthesized reply audio

pub mod driver;
mod handler;
pub mod messages;

pub use driver::SessionDriver;
pub use handler::voice_handler;
pub use messages::{CallEndReason, ClientFrame, MessageRoute, OutgoingMessage};
