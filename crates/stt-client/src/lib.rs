//! Streaming speech-recognition client.
//!
//! Vendor-neutral over WebSocket: the service takes binary PCM frames plus
//! JSON control frames, and emits JSON result frames with ranked alternatives
//! and a partial/final flag.

mod error;
mod live;
pub mod stream;

pub use error::Error;
pub use live::{LiveAudioSink, LiveResponses, LiveSession};
pub use stream::{Alternative, Channel, ControlMessage, StreamResponse};

use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::ClientRequestBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stability {
    Low,
    #[default]
    Medium,
    High,
}

impl Stability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stability::Low => "low",
            Stability::Medium => "medium",
            Stability::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecognizeParams {
    pub encoding: String,
    pub sample_rate: u32,
    pub channels: u8,
    pub interim_results: bool,
    pub stabilization: Stability,
}

impl Default for RecognizeParams {
    fn default() -> Self {
        Self {
            encoding: "linear16".to_string(),
            sample_rate: 16_000,
            channels: 1,
            interim_results: true,
            stabilization: Stability::Medium,
        }
    }
}

#[derive(Default)]
pub struct RecognizeClientBuilder {
    api_base: Option<String>,
    api_key: Option<String>,
    params: Option<RecognizeParams>,
}

impl RecognizeClientBuilder {
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn params(mut self, params: RecognizeParams) -> Self {
        self.params = Some(params);
        self
    }

    pub fn build(self) -> Result<RecognizeClient, Error> {
        let api_base = self.api_base.ok_or(Error::MissingApiBase)?;
        let params = self.params.unwrap_or_default();
        let url = build_ws_url(&api_base, &params)?;

        Ok(RecognizeClient {
            url,
            api_key: self.api_key,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RecognizeClient {
    url: url::Url,
    api_key: Option<String>,
}

impl RecognizeClient {
    pub fn builder() -> RecognizeClientBuilder {
        RecognizeClientBuilder::default()
    }

    pub fn url(&self) -> &url::Url {
        &self.url
    }

    pub async fn connect(&self) -> Result<LiveSession, Error> {
        let uri = self.url.as_str().parse()?;
        let mut request = ClientRequestBuilder::new(uri);
        if let Some(key) = &self.api_key {
            request = request.with_header("Authorization", format!("Token {key}"));
        }

        let (ws, _) = connect_async(request).await?;
        Ok(LiveSession::new(ws))
    }
}

fn build_ws_url(api_base: &str, params: &RecognizeParams) -> Result<url::Url, Error> {
    let mut url: url::Url = api_base.parse()?;
    set_ws_scheme(&mut url);
    append_path_if_missing(&mut url, "listen");

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("encoding", &params.encoding);
        query.append_pair("sample_rate", &params.sample_rate.to_string());
        query.append_pair("channels", &params.channels.to_string());
        query.append_pair(
            "interim_results",
            if params.interim_results { "true" } else { "false" },
        );
        query.append_pair("stabilization", params.stabilization.as_str());
    }

    Ok(url)
}

fn set_ws_scheme(url: &mut url::Url) {
    let mapped = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        _ => return,
    };
    let _ = url.set_scheme(mapped);
}

fn append_path_if_missing(url: &mut url::Url, segment: &str) {
    let already = url
        .path_segments()
        .and_then(|mut segments| segments.next_back().map(|last| last == segment))
        .unwrap_or(false);

    if !already {
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(segment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_base: &str) -> RecognizeClient {
        RecognizeClient::builder()
            .api_base(api_base)
            .build()
            .unwrap()
    }

    #[test]
    fn build_requires_api_base() {
        assert!(matches!(
            RecognizeClient::builder().build(),
            Err(Error::MissingApiBase)
        ));
    }

    #[test]
    fn url_carries_default_audio_params() {
        let url = client("ws://127.0.0.1:9000").url().to_string();

        assert!(url.contains("/listen"));
        assert!(url.contains("encoding=linear16"));
        assert!(url.contains("sample_rate=16000"));
        assert!(url.contains("channels=1"));
        assert!(url.contains("interim_results=true"));
        assert!(url.contains("stabilization=medium"));
    }

    #[test]
    fn http_schemes_map_to_ws() {
        assert_eq!(client("http://localhost:9000").url().scheme(), "ws");
        assert_eq!(client("https://stt.example.com").url().scheme(), "wss");
        assert_eq!(client("wss://stt.example.com").url().scheme(), "wss");
    }

    #[test]
    fn listen_path_not_duplicated() {
        let url = client("ws://stt.example.com/v1/listen").url().to_string();
        assert_eq!(url.matches("listen").count(), 1);
        assert!(url.contains("/v1/listen?"));
    }

    #[test]
    fn stabilization_override_reflected_in_url() {
        let params = RecognizeParams {
            stabilization: Stability::High,
            ..Default::default()
        };
        let url = RecognizeClient::builder()
            .api_base("ws://127.0.0.1:9000")
            .params(params)
            .build()
            .unwrap()
            .url()
            .to_string();

        assert!(url.contains("stabilization=high"));
    }
}
