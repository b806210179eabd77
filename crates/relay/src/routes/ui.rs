use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use murmur_interface::{ClientCommand, UiEvent};

use crate::broadcast::encode;
use crate::state::RelayState;

pub async fn handler(State(state): State<RelayState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: RelayState) {
    let (mut sender, mut receiver) = socket.split();
    let registration = state.broadcaster().register();
    let (id, mut rx, tx) = (registration.id, registration.rx, registration.tx);

    tracing::info!(client_id = id, "ui_client_connected");
    if let Some(payload) = encode(&UiEvent::info("UI connected")) {
        let _ = tx.send(payload);
    }

    let writer = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(raw) => {
                // Malformed or unknown input never tears the connection.
                let Some(command) = ClientCommand::parse(raw.as_str()) else {
                    continue;
                };
                dispatch(&state, &tx, command);
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.broadcaster().unregister(id);
    writer.abort();
    tracing::info!(client_id = id, "ui_client_disconnected");
}

fn dispatch(state: &RelayState, tx: &mpsc::UnboundedSender<String>, command: ClientCommand) {
    match command {
        ClientCommand::SetMute { mute } => {
            state.set_muted(mute);
            tracing::info!(mute, "mute_toggled");
        }
        ClientCommand::AskAi { text } => {
            let text = text.trim().to_string();
            if text.is_empty() {
                return;
            }

            // Answered off-loop so a slow completion never blocks message
            // handling; the reply goes only to this connection.
            let state = state.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let event = match state.answer().answer(&text).await {
                    Ok(answer) => UiEvent::ai_answer(answer),
                    Err(error) => {
                        tracing::warn!(%error, "ai_answer_failed");
                        UiEvent::ai_answer(format!("AI failed: {error}"))
                    }
                };
                if let Some(payload) = encode(&event) {
                    let _ = tx.send(payload);
                }
            });
        }
    }
}
