use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, accept_async, connect_async};

use murmur_answer::AnswerClient;
use murmur_ocr::OcrClient;
use murmur_stt::RecognizeClient;
use relay::{RelayConfig, RelayState, router};

#[derive(Debug, Clone, PartialEq)]
pub enum CapturedFrame {
    Binary(Vec<u8>),
    Text(String),
}

#[derive(Clone, Default)]
pub struct MockSttState {
    frames: Arc<Mutex<Vec<CapturedFrame>>>,
    connections: Arc<Mutex<usize>>,
}

impl MockSttState {
    pub fn frames(&self) -> Vec<CapturedFrame> {
        self.frames.lock().unwrap().clone()
    }

    pub fn binary_frames(&self) -> Vec<Vec<u8>> {
        self.frames()
            .into_iter()
            .filter_map(|f| match f {
                CapturedFrame::Binary(data) => Some(data),
                CapturedFrame::Text(_) => None,
            })
            .collect()
    }

    pub fn connection_count(&self) -> usize {
        *self.connections.lock().unwrap()
    }
}

/// Mock recognition upstream. Accepts any number of connections; on each,
/// captures every incoming frame, replays `responses` as text frames after
/// the first binary audio frame arrives, and answers a CloseStream control
/// frame with a terminal Metadata frame followed by a close.
pub async fn start_mock_stt(responses: Vec<String>) -> (SocketAddr, MockSttState) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = MockSttState::default();

    let accept_state = state.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            *accept_state.connections.lock().unwrap() += 1;

            let state = accept_state.clone();
            let responses = responses.clone();
            tokio::spawn(async move {
                let Ok(ws) = accept_async(stream).await else {
                    return;
                };
                let (mut sender, mut receiver) = ws.split();
                let mut sent_responses = false;

                while let Some(Ok(msg)) = receiver.next().await {
                    match msg {
                        Message::Binary(data) => {
                            state
                                .frames
                                .lock()
                                .unwrap()
                                .push(CapturedFrame::Binary(data.to_vec()));
                            if !sent_responses {
                                sent_responses = true;
                                for response in &responses {
                                    if sender
                                        .send(Message::Text(response.clone().into()))
                                        .await
                                        .is_err()
                                    {
                                        return;
                                    }
                                }
                            }
                        }
                        Message::Text(raw) => {
                            let raw = raw.to_string();
                            let is_close_stream = raw.contains("CloseStream");
                            state.frames.lock().unwrap().push(CapturedFrame::Text(raw));
                            if is_close_stream {
                                let _ = sender
                                    .send(Message::Text(
                                        r#"{"type":"Metadata","request_id":"mock"}"#.into(),
                                    ))
                                    .await;
                                let _ = sender.close().await;
                                return;
                            }
                        }
                        Message::Close(_) => return,
                        _ => {}
                    }
                }
            });
        }
    });

    (addr, state)
}

pub struct TestRelay {
    pub addr: SocketAddr,
    _shutdown: tokio::sync::oneshot::Sender<()>,
}

impl TestRelay {
    pub fn http(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }
}

/// Boot a relay on an ephemeral port wired to the given backends.
pub async fn start_relay(stt_addr: SocketAddr, ocr_base: &str, answer_base: &str) -> TestRelay {
    let stt = RecognizeClient::builder()
        .api_base(format!("ws://{stt_addr}"))
        .build()
        .unwrap();
    let ocr = OcrClient::new(ocr_base);
    let answer = AnswerClient::new(answer_base);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let config = RelayConfig {
        audio_endpoint_url: format!("ws://{addr}/transcribe"),
        media_base_url: "rtmp://127.0.0.1:1935".to_string(),
        // Exits immediately; tests never run a live transcoder.
        ffmpeg_bin: "true".to_string(),
    };
    let state = RelayState::new(config, stt, ocr, answer);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router(state))
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    TestRelay {
        addr,
        _shutdown: shutdown_tx,
    }
}

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct UiClient {
    ws: WsClient,
}

impl UiClient {
    pub async fn connect(url: &str) -> Self {
        let (ws, _) = connect_async(url).await.expect("ui connect failed");
        Self { ws }
    }

    pub async fn send_json(&mut self, value: serde_json::Value) {
        self.ws
            .send(Message::Text(value.to_string().into()))
            .await
            .expect("ui send failed");
    }

    pub async fn send_text(&mut self, raw: &str) {
        self.ws
            .send(Message::Text(raw.to_string().into()))
            .await
            .expect("ui send failed");
    }

    pub async fn next_event(&mut self) -> serde_json::Value {
        loop {
            let msg = tokio::time::timeout(Duration::from_secs(5), self.ws.next())
                .await
                .expect("timed out waiting for ui event")
                .expect("ui stream ended")
                .expect("ui stream errored");
            if let Message::Text(raw) = msg {
                return serde_json::from_str(raw.as_str()).expect("non-json ui event");
            }
        }
    }

    /// Next event of the given type, skipping others (status chatter,
    /// audio_status liveness).
    pub async fn next_event_of(&mut self, event_type: &str) -> serde_json::Value {
        loop {
            let event = self.next_event().await;
            if event["type"] == event_type {
                return event;
            }
        }
    }

    /// Assert nothing arrives within `window`.
    pub async fn expect_silence(&mut self, window: Duration) {
        if let Ok(Some(Ok(msg))) = tokio::time::timeout(window, self.ws.next()).await {
            panic!("expected silence, got {msg:?}");
        }
    }

    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}

pub async fn connect_audio(url: &str) -> WsClient {
    let (ws, _) = connect_async(url).await.expect("audio connect failed");
    ws
}

/// Poll until `f` yields a value or the deadline passes.
pub async fn poll_until<T>(mut f: impl FnMut() -> Option<T>, timeout: Duration) -> T {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(value) = f() {
            return value;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out within {timeout:?}"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
