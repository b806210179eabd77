#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("analysis failed with status {status}: {body}")]
    Api { status: u16, body: String },
}
