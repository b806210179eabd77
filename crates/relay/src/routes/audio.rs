use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures_util::StreamExt;

use murmur_interface::UiEvent;

use crate::state::RelayState;

pub async fn handler(State(state): State<RelayState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: RelayState) {
    tracing::info!("audio_stream_connected");
    state
        .broadcaster()
        .broadcast(&UiEvent::status("audio stream connected"));

    let queue = state.attach_audio_queue();
    let (_sender, mut receiver) = socket.split();

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Binary(data) => {
                // Mute drops the chunk before the queue; liveness is still
                // reported so the UI tracks inbound traffic, not
                // transcription.
                if !state.is_muted() {
                    queue.push(data);
                }
                state.broadcaster().broadcast(&UiEvent::audio_receiving());
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    // End-of-stream for the active transcription session.
    queue.close();
    tracing::info!("audio_stream_disconnected");
    state
        .broadcaster()
        .broadcast(&UiEvent::status("audio stream disconnected"));
}
