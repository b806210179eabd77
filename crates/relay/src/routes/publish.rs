use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use murmur_bridge::{BridgeConfig, BridgeConnector};

use crate::state::RelayState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    #[serde(default)]
    stream_path: String,
}

/// Publish notification from the media server. Each publish gets its own
/// bridge connector, scoped to that stream path.
pub async fn handler(
    State(state): State<RelayState>,
    Json(request): Json<PublishRequest>,
) -> Response {
    let path = request.stream_path.trim();
    if path.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Missing streamPath"})),
        )
            .into_response();
    }

    let config = state.config();
    let media_url = format!(
        "{}/{}",
        config.media_base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    tracing::info!(media_url = %media_url, "media_publish_received");

    let connector = BridgeConnector::new(BridgeConfig {
        relay_url: config.audio_endpoint_url.clone(),
        media_url,
        ffmpeg_bin: config.ffmpeg_bin.clone(),
    });
    tokio::spawn(connector.run());

    (StatusCode::OK, Json(json!({"ok": true}))).into_response()
}
