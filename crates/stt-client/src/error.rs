#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("api_base is required")]
    MissingApiBase,
    #[error("invalid api_base: {0}")]
    InvalidApiBase(#[from] url::ParseError),
    #[error("invalid request uri: {0}")]
    InvalidUri(#[from] tokio_tungstenite::tungstenite::http::uri::InvalidUri),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}
