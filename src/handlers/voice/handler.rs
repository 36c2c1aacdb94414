//! Voice WebSocket handler
//!
//! Upgrades `/ws`, splits the socket, and wires it to a [`SessionDriver`]:
//! a writer task owns the sink, the driver owns the session, and this task
//! pumps client frames into the driver.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::state::AppState;

use super::driver::SessionDriver;
use super::messages::{ClientFrame, MessageRoute};

/// Channel buffer size for audio workloads
const CHANNEL_BUFFER_SIZE: usize = 1024;

/// Maximum WebSocket frame size (10 MB)
const MAX_WS_FRAME_SIZE: usize = 10 * 1024 * 1024;

/// Maximum WebSocket message size (10 MB)
const MAX_WS_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// How long the writer may take to flush and close after the session ends
const WRITER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Voice WebSocket handler
///
/// # Returns
/// * `Response` - HTTP response that upgrades the connection to WebSocket
pub async fn voice_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    info!("Voice WebSocket connection upgrade requested");

    ws.max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_voice_socket(socket, state))
}

/// Handle one voice connection until either side goes away
async fn handle_voice_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let session_id = Uuid::new_v4().to_string();
    info!(session_id = %session_id, "Voice WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();
    let (message_tx, mut message_rx) = mpsc::channel::<MessageRoute>(CHANNEL_BUFFER_SIZE);
    let (frame_tx, frame_rx) = mpsc::channel::<ClientFrame>(CHANNEL_BUFFER_SIZE);

    // Sender task for outgoing messages
    let mut sender_task = tokio::spawn(async move {
        while let Some(route) = message_rx.recv().await {
            let result = match route {
                MessageRoute::Outgoing(message) => match serde_json::to_string(&message) {
                    Ok(json_str) => sender.send(Message::Text(json_str.into())).await,
                    Err(e) => {
                        error!("Failed to serialize outgoing message: {}", e);
                        continue;
                    }
                },
                MessageRoute::Audio(data) => sender.send(Message::Binary(data)).await,
                MessageRoute::Close => {
                    // The peer may already have closed its side
                    if let Err(e) = sender.send(Message::Close(None)).await {
                        debug!("Close frame not sent: {}", e);
                    }
                    break;
                }
            };

            if let Err(e) = result {
                error!("Failed to send WebSocket message: {}", e);
                break;
            }
        }
    });

    let driver = SessionDriver::new(
        session_id.clone(),
        app_state.session_config.clone(),
        app_state.services.clone(),
        message_tx,
    );
    let driver_task = tokio::spawn(driver.run(frame_rx));

    while let Some(msg_result) = receiver.next().await {
        let frame = match msg_result {
            Ok(Message::Binary(data)) => ClientFrame::Audio(data),
            Ok(Message::Text(text)) => ClientFrame::from_text(text.as_str()),
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Ok(Message::Close(_)) => {
                info!(session_id = %session_id, "Voice WebSocket close received");
                break;
            }
            Err(e) => {
                warn!(session_id = %session_id, "Voice WebSocket error: {}", e);
                break;
            }
        };

        if frame_tx.send(frame).await.is_err() {
            debug!(session_id = %session_id, "Session driver stopped");
            break;
        }
    }

    // Closing the inbound channel stops the driver, which cancels any turn
    // and queues a close for the writer
    drop(frame_tx);
    if let Err(e) = driver_task.await {
        error!(session_id = %session_id, "Session driver panicked: {}", e);
    }
    if tokio::time::timeout(WRITER_SHUTDOWN_TIMEOUT, &mut sender_task)
        .await
        .is_err()
    {
        debug!(session_id = %session_id, "Writer did not finish in time, aborting");
        sender_task.abort();
    }

    info!(session_id = %session_id, "Voice WebSocket connection terminated");
}
