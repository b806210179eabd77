use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::Error;
use crate::stream::{ControlMessage, StreamResponse};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One connected recognition exchange. Split into an audio sink and a
/// response stream so sending and receiving can run as separate tasks.
pub struct LiveSession {
    inner: WsStream,
}

impl LiveSession {
    pub(crate) fn new(inner: WsStream) -> Self {
        Self { inner }
    }

    pub fn split(self) -> (LiveAudioSink, LiveResponses) {
        let (sink, stream) = self.inner.split();
        (LiveAudioSink { sink }, LiveResponses { stream })
    }
}

pub struct LiveAudioSink {
    sink: SplitSink<WsStream, Message>,
}

impl LiveAudioSink {
    /// Forward one raw PCM chunk as a binary frame.
    pub async fn send_audio(&mut self, chunk: Bytes) -> Result<(), Error> {
        self.sink.send(Message::Binary(chunk)).await?;
        Ok(())
    }

    /// Signal end of audio. The service finishes pending results and
    /// terminates the exchange from its side.
    pub async fn finish(&mut self) -> Result<(), Error> {
        let payload = serde_json::to_string(&ControlMessage::CloseStream).unwrap();
        self.sink.send(Message::Text(payload.into())).await?;
        Ok(())
    }
}

pub struct LiveResponses {
    stream: SplitStream<WsStream>,
}

impl LiveResponses {
    /// Next recognition response, or `None` once the exchange is over.
    /// Frames that do not parse as a known response are skipped.
    pub async fn next_response(&mut self) -> Option<Result<StreamResponse, Error>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(raw)) => match serde_json::from_str(raw.as_str()) {
                    Ok(resp) => return Some(Ok(resp)),
                    Err(error) => {
                        tracing::warn!(%error, "unparseable_stream_response");
                    }
                },
                Ok(Message::Close(_)) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
