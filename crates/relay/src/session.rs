use std::sync::Arc;

use murmur_audio_queue::ChunkQueue;
use murmur_interface::UiEvent;
use murmur_stt::{RecognizeClient, StreamResponse};

use crate::broadcast::Broadcaster;

/// One streaming exchange with the recognition service, bound to one live
/// audio queue. Chunks are forwarded in pull order; transcript events are
/// broadcast in the order the service emits them. A service-side failure
/// terminates the session (the queue is closed); the next bridge reconnect
/// starts a fresh one.
pub(crate) async fn run_transcription(
    queue: Arc<ChunkQueue>,
    stt: RecognizeClient,
    broadcaster: Broadcaster,
) {
    let session_id = uuid::Uuid::new_v4();

    let session = match stt.connect().await {
        Ok(session) => session,
        Err(error) => {
            tracing::error!(%error, %session_id, "recognition_connect_failed");
            broadcaster.broadcast(&UiEvent::error(format!("transcription unavailable: {error}")));
            queue.close();
            return;
        }
    };
    tracing::info!(%session_id, "transcription_session_started");

    let (mut sink, mut responses) = session.split();

    let pump = {
        let queue = queue.clone();
        tokio::spawn(async move {
            while let Some(chunk) = queue.pull().await {
                if sink.send_audio(chunk).await.is_err() {
                    return;
                }
            }
            let _ = sink.finish().await;
        })
    };

    while let Some(response) = responses.next_response().await {
        match response {
            Ok(resp @ StreamResponse::TranscriptResponse { .. }) => {
                let Some(text) = resp.text() else { continue };
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                let is_partial = resp.is_partial().unwrap_or(false);
                broadcaster.broadcast(&UiEvent::transcript(text, is_partial));
            }
            Ok(StreamResponse::TerminalResponse { .. }) => break,
            Ok(StreamResponse::ErrorResponse { error_message, .. }) => {
                tracing::error!(error = %error_message, %session_id, "recognition_stream_error");
                broadcaster.broadcast(&UiEvent::error(error_message));
                break;
            }
            Ok(_) => {}
            Err(error) => {
                tracing::error!(%error, %session_id, "recognition_transport_error");
                broadcaster.broadcast(&UiEvent::error(error.to_string()));
                break;
            }
        }
    }

    // Session is over either way; stop accepting chunks so the pump drains
    // out on end-of-stream.
    queue.close();
    let _ = pump.await;
    tracing::info!(%session_id, "transcription_session_finished");
}
