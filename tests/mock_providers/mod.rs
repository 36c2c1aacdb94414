//! Scripted upstream services
//!
//! In-process stand-ins for the transcription, generation and synthesis
//! services. Each one replays scripted results in order (repeating a
//! fallback once the script runs out) and records how it was called.

// Not every test binary uses every mock
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream;

use voice_turn_gateway::core::llm::{ConversationEntry, LLMError, TextGenerator};
use voice_turn_gateway::core::stt::{STTError, Transcriber, Transcription};
use voice_turn_gateway::core::tts::{AudioStream, SpeechSynthesizer, TTSError};

/// Call counters shared by the mocks
#[derive(Debug, Default)]
pub struct MockStats {
    pub total_requests: AtomicU64,
    pub failed_requests: AtomicU64,
}

impl MockStats {
    pub fn record(&self, ok: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn calls(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failed_requests.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Transcription
// =============================================================================

pub struct ScriptedTranscriber {
    script: Mutex<VecDeque<Result<Transcription, STTError>>>,
    fallback: Result<Transcription, STTError>,
    /// Time spent on each call before answering
    latency: Duration,
    pub received: Mutex<Vec<Bytes>>,
    pub stats: MockStats,
}

impl ScriptedTranscriber {
    /// Always returns `transcript` with `emotion`
    pub fn replying(transcript: &str, emotion: &str) -> Self {
        Self::with_fallback(Ok(Transcription::new(transcript, emotion)))
    }

    /// Always fails with a network error
    pub fn failing() -> Self {
        Self::with_fallback(Err(STTError::NetworkError(
            "connection refused".to_string(),
        )))
    }

    pub fn with_fallback(fallback: Result<Transcription, STTError>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            latency: Duration::ZERO,
            received: Mutex::new(Vec::new()),
            stats: MockStats::default(),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue a result ahead of the fallback
    pub fn then(self, result: Result<Transcription, STTError>) -> Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    pub fn received_lengths(&self) -> Vec<usize> {
        self.received.lock().unwrap().iter().map(|b| b.len()).collect()
    }
}

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe(&self, audio: Bytes) -> Result<Transcription, STTError> {
        self.received.lock().unwrap().push(audio);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let result = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        self.stats.record(result.is_ok());
        result
    }

    fn provider_name(&self) -> &'static str {
        "scripted-stt"
    }
}

// =============================================================================
// Generation
// =============================================================================

pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, LLMError>>>,
    fallback: Result<String, LLMError>,
    pub histories: Mutex<Vec<Vec<ConversationEntry>>>,
    pub temperatures: Mutex<Vec<f32>>,
    pub stats: MockStats,
}

impl ScriptedGenerator {
    pub fn replying(text: &str) -> Self {
        Self::with_fallback(Ok(text.to_string()))
    }

    pub fn failing(status: u16) -> Self {
        Self::with_fallback(Err(LLMError::ProviderError {
            status,
            body: "upstream said no".to_string(),
        }))
    }

    pub fn with_fallback(fallback: Result<String, LLMError>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            histories: Mutex::new(Vec::new()),
            temperatures: Mutex::new(Vec::new()),
            stats: MockStats::default(),
        }
    }

    pub fn then(self, result: Result<String, LLMError>) -> Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    /// History passed to the most recent call
    pub fn last_history(&self) -> Option<Vec<ConversationEntry>> {
        self.histories.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        history: &[ConversationEntry],
        temperature: f32,
    ) -> Result<String, LLMError> {
        self.histories.lock().unwrap().push(history.to_vec());
        self.temperatures.lock().unwrap().push(temperature);
        let result = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        self.stats.record(result.is_ok());
        result
    }

    fn provider_name(&self) -> &'static str {
        "scripted-llm"
    }
}

// =============================================================================
// Synthesis
// =============================================================================

pub struct ScriptedSynthesizer {
    chunks: Vec<Bytes>,
    /// Delay before each chunk after the first
    chunk_interval: Duration,
    error: Option<TTSError>,
    pub texts: Mutex<Vec<String>>,
    pub stats: MockStats,
}

impl ScriptedSynthesizer {
    /// Streams `chunks` back to back
    pub fn streaming(chunks: Vec<Bytes>) -> Self {
        Self {
            chunks,
            chunk_interval: Duration::ZERO,
            error: None,
            texts: Mutex::new(Vec::new()),
            stats: MockStats::default(),
        }
    }

    /// Streams `chunks`, waiting `interval` before every chunk but the first
    pub fn paced(chunks: Vec<Bytes>, interval: Duration) -> Self {
        Self {
            chunk_interval: interval,
            ..Self::streaming(chunks)
        }
    }

    pub fn failing(error: TTSError) -> Self {
        Self {
            error: Some(error),
            ..Self::streaming(Vec::new())
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for ScriptedSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<AudioStream, TTSError> {
        self.texts.lock().unwrap().push(text.to_string());
        if let Some(error) = &self.error {
            self.stats.record(false);
            return Err(error.clone());
        }
        self.stats.record(true);

        let interval = self.chunk_interval;
        let chunks = self.chunks.clone().into_iter().enumerate();
        let audio = stream::iter(chunks).then(move |(i, chunk)| async move {
            if i > 0 && !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }
            Ok::<_, TTSError>(chunk)
        });
        Ok(audio.boxed())
    }

    fn provider_name(&self) -> &'static str {
        "scripted-tts"
    }
}
