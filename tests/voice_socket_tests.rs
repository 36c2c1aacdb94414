//! Voice Socket Tests
//!
//! Run the real router on a local port and talk to `/ws` with a WebSocket
//! client, with the upstream services served by wiremock.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voice_turn_gateway::{ServerConfig, core::SessionConfig, routes, state::AppState};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn test_config(upstream: &MockServer) -> ServerConfig {
    let session = SessionConfig {
        utterance_boundary: Duration::from_millis(100),
        min_utterance_secs: 0.1,
        ..SessionConfig::default()
    };
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_allowed_origins: None,
        transcription_url: format!("{}/transcribe_and_emotion", upstream.uri()),
        upstream_timeout_seconds: 5,
        gemini_api_key: None,
        gemini_model: "gemini-1.5-flash".to_string(),
        gemini_base_url: Some(upstream.uri()),
        elevenlabs_api_key: None,
        elevenlabs_voice_id: "21m00Tcm4TlvDq8ikWAM".to_string(),
        elevenlabs_model_id: "eleven_turbo_v2_5".to_string(),
        elevenlabs_base_url: None,
        session,
    }
}

async fn start_server(config: ServerConfig) -> SocketAddr {
    let app_state = AppState::new(config).await;
    let app = routes::create_router().with_state(app_state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    client
}

/// Next JSON frame, skipping binary audio
async fn next_json(client: &mut Client) -> Value {
    loop {
        let msg = timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

fn pcm(amplitude: i16) -> Vec<u8> {
    (0..4096)
        .flat_map(|i| {
            let s = if (i / 24) % 2 == 0 { amplitude } else { -amplitude };
            s.to_le_bytes()
        })
        .collect()
}

#[tokio::test]
async fn test_spoken_turn_over_socket() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/transcribe_and_emotion"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transcription": "hello there",
            "emotion": "happy"
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let addr = start_server(test_config(&upstream)).await;
    let mut client = connect(addr).await;

    client
        .send(Message::Text("start_audio_stream".into()))
        .await
        .unwrap();
    for _ in 0..3 {
        client.send(Message::Binary(pcm(1000).into())).await.unwrap();
    }
    for _ in 0..4 {
        client.send(Message::Binary(pcm(0).into())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
    }

    assert_eq!(
        next_json(&mut client).await,
        json!({"type": "message", "text": "You: hello there"})
    );
    assert_eq!(
        next_json(&mut client).await,
        json!({"type": "emotion", "value": "happy"})
    );
    assert_eq!(
        next_json(&mut client).await,
        json!({
            "type": "message",
            "text": "Server: My AI capabilities are not configured (missing Gemini API key)."
        })
    );
}

#[tokio::test]
async fn test_typed_text_over_socket() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Hi! How can I help?" }] }
            }]
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let mut config = test_config(&upstream);
    config.gemini_api_key = Some("test-key".to_string());
    let addr = start_server(config).await;
    let mut client = connect(addr).await;

    client.send(Message::Text("hello".into())).await.unwrap();

    assert_eq!(
        next_json(&mut client).await,
        json!({"type": "message", "text": "Bot: Hi! How can I help?"})
    );
    assert_eq!(
        next_json(&mut client).await,
        json!({
            "type": "message",
            "text": "Server: My voice is not configured (missing ElevenLabs API key)."
        })
    );
}

#[tokio::test]
async fn test_stop_stream_over_socket() {
    let upstream = MockServer::start().await;
    let addr = start_server(test_config(&upstream)).await;
    let mut client = connect(addr).await;

    client
        .send(Message::Text("start_audio_stream".into()))
        .await
        .unwrap();
    client
        .send(Message::Text("stop_audio_stream".into()))
        .await
        .unwrap();

    assert_eq!(
        next_json(&mut client).await,
        json!({"type": "call_ended_by_server", "reason": "manual_stop"})
    );
}
