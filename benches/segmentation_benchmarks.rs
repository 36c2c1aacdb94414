//! Performance benchmarks for the voice turn gateway
//!
//! Run with: cargo bench
//! Or for specific benchmarks: cargo bench -- <filter>

use bytes::Bytes;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use voice_turn_gateway::core::llm::extract_direct_reply;
use voice_turn_gateway::core::session::{Session, SessionConfig};
use voice_turn_gateway::core::vad::{
    EnergyDetector, VADConfig, VoiceActivityDetector, calculate_rms,
};
use voice_turn_gateway::handlers::voice::OutgoingMessage;

fn pcm_chunk(bytes: usize, amplitude: i16) -> Bytes {
    let samples = bytes / 2;
    let mut out = Vec::with_capacity(bytes);
    for i in 0..samples {
        let sample = if (i / 24) % 2 == 0 { amplitude } else { -amplitude };
        out.extend_from_slice(&sample.to_le_bytes());
    }
    Bytes::from(out)
}

/// Benchmark RMS over common chunk sizes
fn bench_rms(c: &mut Criterion) {
    let mut group = c.benchmark_group("rms");
    group.measurement_time(Duration::from_secs(5));

    for size in [1024usize, 4096, 8192, 32768] {
        let chunk = pcm_chunk(size, 1000);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("int16", size), &chunk, |b, chunk| {
            b.iter(|| calculate_rms(black_box(chunk), 2));
        });
    }

    group.finish();
}

/// Benchmark chunk classification
fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");
    let detector = EnergyDetector::new(&VADConfig::default());
    let speech = pcm_chunk(8192, 1000);
    let silence = Bytes::from(vec![0u8; 8192]);

    group.throughput(Throughput::Bytes(8192));
    group.bench_function("speech", |b| b.iter(|| detector.classify(black_box(&speech))));
    group.bench_function("silence", |b| b.iter(|| detector.classify(black_box(&silence))));
    group.finish();
}

/// Benchmark one utterance worth of chunks through the session state machine
fn bench_session_audio(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    // Call-end timers are spawned onto the ambient runtime
    let _guard = runtime.enter();

    let config = Arc::new(SessionConfig::default());
    let speech = pcm_chunk(8192, 1000);
    let silence = Bytes::from(vec![0u8; 8192]);

    c.bench_function("session_utterance_chunks", |b| {
        b.iter(|| {
            let (timer_tx, _timer_rx) = mpsc::unbounded_channel();
            let mut session = Session::new("bench", config.clone(), timer_tx);
            let now = tokio::time::Instant::now();
            for _ in 0..12 {
                black_box(session.on_audio(speech.clone(), now));
            }
            for _ in 0..3 {
                black_box(session.on_audio(silence.clone(), now));
            }
        });
    });
}

/// Benchmark reply extraction on typical generation output
fn bench_reply_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("reply_extraction");

    let direct = "I'm so glad to hear that! What made your day so good?";
    let options = "Here are a few options:\n\n**Option 1 (direct):** \"I'm doing well, thanks!\"\n**Option 2 (casual):** \"Pretty good!\"";
    let meta = "The best response depends on the context.\n\nThat sounds wonderful.";

    group.bench_function("direct", |b| b.iter(|| extract_direct_reply(black_box(direct))));
    group.bench_function("options", |b| b.iter(|| extract_direct_reply(black_box(options))));
    group.bench_function("meta", |b| b.iter(|| extract_direct_reply(black_box(meta))));
    group.finish();
}

/// Benchmark outgoing message serialization
fn bench_message_serialization(c: &mut Criterion) {
    let message = OutgoingMessage::message("Bot: I'm doing well, thanks! How about you?");
    let emotion = OutgoingMessage::Emotion {
        value: "happy".to_string(),
    };

    c.bench_function("serialize_message", |b| {
        b.iter(|| serde_json::to_string(black_box(&message)))
    });
    c.bench_function("serialize_emotion", |b| {
        b.iter(|| serde_json::to_string(black_box(&emotion)))
    });
}

criterion_group!(
    benches,
    bench_rms,
    bench_classification,
    bench_session_audio,
    bench_reply_extraction,
    bench_message_serialization,
);
criterion_main!(benches);
