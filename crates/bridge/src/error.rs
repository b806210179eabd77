#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to spawn transcoder: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("transcoder stdout not captured")]
    MissingStdout,
}
