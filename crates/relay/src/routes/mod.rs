mod audio;
mod ocr;
mod publish;
mod ui;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::RelayState;

pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/ui", get(ui::handler))
        .route("/transcribe", get(audio::handler))
        .route("/ocr", post(ocr::handler))
        .route("/publish", post(publish::handler))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods(cors::Any)
                .allow_headers(cors::Any),
        )
        .layer(TraceLayer::new_for_http())
}
