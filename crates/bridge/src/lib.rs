//! Media-side bridge: pairs an audio-transcoding subprocess with an outbound
//! socket to the relay's audio endpoint, and keeps the pair healthy across
//! drops with capped exponential backoff.

mod backoff;
mod connector;
mod error;
mod transcoder;

pub use backoff::Backoff;
pub use connector::{
    BridgeConfig, BridgeConnector, BridgeState, Step, StreamEnd, on_connect_error, on_stream_end,
};
pub use error::Error;
pub use transcoder::Transcoder;
