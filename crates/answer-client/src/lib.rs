//! Chat-completion client for answering questions over the live transcript.
//! One non-streaming request per question against an OpenAI-compatible
//! endpoint; no retries, no server-side cancellation.

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const NO_ANSWER: &str = "No answer";

/// Instruction sent with every request. The answerer sees transcript
/// excerpts, OCR text, or short prompts and is expected to reply directly,
/// without preamble, and to say when it lacks context.
pub const SYSTEM_INSTRUCTION: &str = "\
You are a real-time assistant for someone following a live conversation. \
Your input is a short prompt that may quote the running speech transcript or \
text captured from the user's screen. Answer directly and concisely: no \
preamble, no restating the question. If the transcript contains a question, \
answer that question. If the prompt is too ambiguous to answer, reply with \
one short clarifying question instead. If you do not have enough information, \
say so plainly rather than guessing.";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion failed with status {status}: {body}")]
    Api { status: u16, body: String },
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AnswerClient {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
}

impl AnswerClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Ask one question. An upstream success with no usable content yields
    /// the `NO_ANSWER` fallback rather than an error.
    pub async fn answer(&self, text: &str) -> Result<String, Error> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let answer = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| NO_ANSWER.to_string());

        Ok(answer)
    }
}
