use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::json;

use crate::state::RelayState;

#[derive(Debug, Deserialize)]
pub struct OcrRequest {
    #[serde(default)]
    image: String,
}

pub async fn handler(
    State(state): State<RelayState>,
    Json(request): Json<OcrRequest>,
) -> Response {
    let image = request.image.trim();
    if image.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Missing image"})),
        )
            .into_response();
    }

    let encoded = strip_data_url_prefix(image);
    let bytes = match BASE64.decode(encoded) {
        Ok(bytes) => bytes,
        Err(error) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Invalid image encoding", "details": error.to_string()})),
            )
                .into_response();
        }
    };

    match state.ocr().analyze(&bytes).await {
        Ok(analysis) => {
            (StatusCode::OK, Json(json!({"text": analysis.line_text()}))).into_response()
        }
        Err(error) => {
            tracing::error!(%error, "ocr_analysis_failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Document analysis failed", "details": error.to_string()})),
            )
                .into_response()
        }
    }
}

/// Accepts both bare base64 and `data:image/...;base64,` payloads.
fn strip_data_url_prefix(image: &str) -> &str {
    if image.starts_with("data:image/") {
        if let Some(idx) = image.find("base64,") {
            return &image[idx + "base64,".len()..];
        }
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_prefix_is_stripped() {
        assert_eq!(
            strip_data_url_prefix("data:image/png;base64,AAAA"),
            "AAAA"
        );
        assert_eq!(
            strip_data_url_prefix("data:image/jpeg;base64,Zm9v"),
            "Zm9v"
        );
    }

    #[test]
    fn bare_base64_passes_through() {
        assert_eq!(strip_data_url_prefix("Zm9vYmFy"), "Zm9vYmFy");
    }

    #[test]
    fn non_image_data_url_passes_through() {
        let input = "data:text/plain;base64,Zm9v";
        assert_eq!(strip_data_url_prefix(input), input);
    }
}
