use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub transcript: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub alternatives: Vec<Alternative>,
}

/// Responses on a live recognition exchange. Alternatives are ranked;
/// consumers take the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[non_exhaustive]
pub enum StreamResponse {
    #[serde(rename = "Results")]
    TranscriptResponse {
        #[serde(default)]
        is_final: bool,
        channel: Channel,
    },
    #[serde(rename = "Metadata")]
    TerminalResponse {
        #[serde(default)]
        request_id: String,
    },
    #[serde(rename = "Error")]
    ErrorResponse {
        error_message: String,
        #[serde(default)]
        error_code: Option<i32>,
    },
}

impl StreamResponse {
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamResponse::TranscriptResponse { channel, .. } => {
                channel.alternatives.first().map(|a| a.transcript.as_str())
            }
            _ => None,
        }
    }

    pub fn is_partial(&self) -> Option<bool> {
        match self {
            StreamResponse::TranscriptResponse { is_final, .. } => Some(!is_final),
            _ => None,
        }
    }
}

/// Control frames sent to the recognition service as JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    KeepAlive,
    Finalize,
    CloseStream,
}
