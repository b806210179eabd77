//! The relay server: accepts transcoded audio from the media bridge on one
//! endpoint, fans transcript/status/answer events out to UI clients on
//! another, and bridges OCR and AI requests to their backing services.

mod broadcast;
mod routes;
mod session;
mod state;

pub use broadcast::Broadcaster;
pub use routes::router;
pub use state::{RelayConfig, RelayState};
