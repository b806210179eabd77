//! Wire contract for the UI endpoint: events the relay pushes to dashboard
//! clients and the commands those clients send back. Everything is JSON text
//! frames tagged by `type`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioSignal {
    Receiving,
}

/// Server -> client events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    Info {
        message: String,
    },
    Status {
        message: String,
    },
    AudioStatus {
        status: AudioSignal,
    },
    Transcript {
        transcript: String,
        #[serde(rename = "isPartial")]
        is_partial: bool,
    },
    AiAnswer {
        text: String,
    },
    Error {
        message: String,
    },
}

impl UiEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self::Info {
            message: message.into(),
        }
    }

    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    pub fn audio_receiving() -> Self {
        Self::AudioStatus {
            status: AudioSignal::Receiving,
        }
    }

    pub fn transcript(transcript: impl Into<String>, is_partial: bool) -> Self {
        Self::Transcript {
            transcript: transcript.into(),
            is_partial,
        }
    }

    pub fn ai_answer(text: impl Into<String>) -> Self {
        Self::AiAnswer { text: text.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Client -> server commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    SetMute { mute: bool },
    AskAi { text: String },
}

impl ClientCommand {
    /// Tolerant parse: non-JSON input and unknown `type` values yield `None`
    /// so the connection handler can drop them without erroring.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}
