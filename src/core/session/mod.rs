//! Per-connection session state.
//!
//! A [`Session`] owns everything that changes while a call is live: the
//! utterance buffer, silence timers, turn bookkeeping, the conversation
//! transcript and the failure debouncer. It is driven by a single event
//! loop and never shared between tasks.

pub mod buffer;
pub mod config;
pub mod debounce;
pub mod state;
pub mod timers;

pub use buffer::UtteranceBuffer;
pub use config::SessionConfig;
pub use debounce::ErrorDebouncer;
pub use state::{AudioOutcome, BoundaryState, CallEndDecision, Session};
pub use timers::{CallEndTimer, SilenceTracker, TimerEvent};
