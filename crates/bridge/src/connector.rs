use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::backoff::Backoff;
use crate::transcoder::Transcoder;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Relay audio endpoint, e.g. `ws://127.0.0.1:8080/transcribe`.
    pub relay_url: String,
    /// Media source fed to the transcoder, e.g. `rtmp://127.0.0.1:1935/live/x`.
    pub media_url: String,
    pub ffmpeg_bin: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Connecting,
    Streaming,
    Closing,
    Reconnecting,
    Stopped,
}

/// How a streaming session ended.
#[derive(Debug)]
pub enum StreamEnd {
    /// The transcoder reached EOF or exited: the media stream is over and
    /// the socket has already been closed from our side.
    TranscoderExited,
    /// The transcoder could not even be spawned (bad binary/config).
    TranscoderSpawnFailed,
    SocketClosed,
    SocketError(String),
}

/// What the connector does next. Subprocess and socket are one paired
/// lifecycle: whenever the socket dies first, the transcoder must be killed
/// before any reconnect is scheduled.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Reconnect { kill_transcoder: bool },
    Stop,
}

/// Transition for a failed connection attempt: no subprocess was spawned,
/// so only the reconnect timer is involved.
pub fn on_connect_error() -> Step {
    Step::Reconnect {
        kill_transcoder: false,
    }
}

/// Transition for the end of a streaming session.
pub fn on_stream_end(end: &StreamEnd) -> Step {
    match end {
        StreamEnd::TranscoderExited | StreamEnd::TranscoderSpawnFailed => Step::Stop,
        StreamEnd::SocketClosed | StreamEnd::SocketError(_) => Step::Reconnect {
            kill_transcoder: true,
        },
    }
}

/// Maintains one healthy path from a media URL to the relay's audio
/// endpoint, recreating the transcoding subprocess and the outbound socket
/// together whenever either fails. One connector per inbound publish event.
pub struct BridgeConnector {
    config: BridgeConfig,
    backoff: Backoff,
    state: BridgeState,
}

impl BridgeConnector {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            backoff: Backoff::default(),
            state: BridgeState::Connecting,
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub async fn run(mut self) {
        loop {
            self.state = BridgeState::Connecting;
            tracing::info!(
                attempt = self.backoff.attempt(),
                url = %self.config.relay_url,
                "bridge_connecting"
            );

            let ws = match connect_async(self.config.relay_url.as_str()).await {
                Ok((ws, _)) => ws,
                Err(error) => {
                    tracing::warn!(%error, "bridge_connect_failed");
                    match on_connect_error() {
                        Step::Reconnect { .. } => {
                            self.wait_reconnect().await;
                            continue;
                        }
                        Step::Stop => break,
                    }
                }
            };

            self.backoff.reset();
            let (end, transcoder) = self.stream(ws).await;
            self.state = BridgeState::Closing;

            match on_stream_end(&end) {
                Step::Stop => {
                    tracing::info!(end = ?end, "bridge_stopped");
                    self.state = BridgeState::Stopped;
                    break;
                }
                Step::Reconnect { kill_transcoder } => {
                    if kill_transcoder {
                        if let Some(mut transcoder) = transcoder {
                            transcoder.kill().await;
                        }
                    }
                    tracing::info!(end = ?end, "bridge_session_ended");
                    self.wait_reconnect().await;
                }
            }
        }
    }

    async fn wait_reconnect(&mut self) {
        self.state = BridgeState::Reconnecting;
        let delay = self.backoff.next_delay();
        tracing::info!(delay_ms = delay.as_millis() as u64, "bridge_reconnect_scheduled");
        tokio::time::sleep(delay).await;
    }

    /// Pump transcoder stdout onto the socket until either side ends.
    /// Returns the transcoder when it may still be alive so the caller can
    /// apply the teardown step.
    async fn stream(&mut self, ws: WsStream) -> (StreamEnd, Option<Transcoder>) {
        let spawned = Transcoder::spawn(&self.config.ffmpeg_bin, &self.config.media_url);
        let (mut transcoder, mut stdout) = match spawned {
            Ok(pair) => pair,
            Err(error) => {
                tracing::error!(%error, bin = %self.config.ffmpeg_bin, "transcoder_spawn_failed");
                let (mut sink, _) = ws.split();
                let _ = sink.close().await;
                return (StreamEnd::TranscoderSpawnFailed, None);
            }
        };

        self.state = BridgeState::Streaming;
        tracing::info!(media_url = %self.config.media_url, "bridge_streaming");

        let (mut sink, mut socket) = ws.split();
        let mut buf = vec![0u8; 8192];

        loop {
            tokio::select! {
                read = stdout.read(&mut buf) => match read {
                    Ok(0) => {
                        let _ = transcoder.wait().await;
                        let _ = sink.close().await;
                        return (StreamEnd::TranscoderExited, None);
                    }
                    Ok(n) => {
                        let frame = Bytes::copy_from_slice(&buf[..n]);
                        if let Err(error) = sink.send(Message::Binary(frame)).await {
                            return (StreamEnd::SocketError(error.to_string()), Some(transcoder));
                        }
                    }
                    Err(error) => {
                        tracing::warn!(%error, "transcoder_read_failed");
                        transcoder.kill().await;
                        let _ = sink.close().await;
                        return (StreamEnd::TranscoderExited, None);
                    }
                },
                msg = socket.next() => match msg {
                    None | Some(Ok(Message::Close(_))) => {
                        return (StreamEnd::SocketClosed, Some(transcoder));
                    }
                    Some(Err(error)) => {
                        return (StreamEnd::SocketError(error.to_string()), Some(transcoder));
                    }
                    // No payloads are expected on the audio endpoint.
                    Some(Ok(_)) => {}
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_failure_kills_transcoder_before_reconnect() {
        let step = on_stream_end(&StreamEnd::SocketError("reset by peer".into()));
        assert_eq!(
            step,
            Step::Reconnect {
                kill_transcoder: true
            }
        );

        let step = on_stream_end(&StreamEnd::SocketClosed);
        assert_eq!(
            step,
            Step::Reconnect {
                kill_transcoder: true
            }
        );
    }

    #[test]
    fn transcoder_exit_stops_the_session() {
        assert_eq!(on_stream_end(&StreamEnd::TranscoderExited), Step::Stop);
        assert_eq!(on_stream_end(&StreamEnd::TranscoderSpawnFailed), Step::Stop);
    }

    #[test]
    fn connect_error_reconnects_without_a_subprocess_to_kill() {
        assert_eq!(
            on_connect_error(),
            Step::Reconnect {
                kill_transcoder: false
            }
        );
    }
}
