//! Document-analysis client. Submits an image for form and table detection
//! and returns the service's classified text blocks.

mod error;

pub use error::Error;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Classification from the service (`line`, `word`, `key_value`, ...).
    /// Unknown kinds are carried through untouched.
    pub block_type: String,
    #[serde(default)]
    pub text: String,
}

impl Block {
    pub fn is_line(&self) -> bool {
        self.block_type.eq_ignore_ascii_case("line")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl AnalyzeResponse {
    /// Text of every line-classified block, newline-joined.
    pub fn line_text(&self) -> String {
        self.blocks
            .iter()
            .filter(|b| b.is_line())
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
enum Feature {
    Forms,
    Tables,
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    document: &'a str,
    features: &'a [Feature],
}

#[derive(Debug, Clone)]
pub struct OcrClient {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
}

impl OcrClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// One analysis round trip: image bytes in, classified blocks out.
    pub async fn analyze(&self, image: &[u8]) -> Result<AnalyzeResponse, Error> {
        let document = BASE64.encode(image);
        let url = format!("{}/v1/analyze", self.api_base.trim_end_matches('/'));

        let mut request = self.client.post(&url).json(&AnalyzeRequest {
            document: &document,
            features: &[Feature::Forms, Feature::Tables],
        });
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

        Ok(response.json().await?)
    }
}
