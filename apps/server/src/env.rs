use std::sync::OnceLock;

use serde::Deserialize;

fn default_port() -> u16 {
    8080
}

fn default_answer_api_base() -> String {
    murmur_answer::DEFAULT_API_BASE.to_string()
}

fn default_answer_model() -> String {
    murmur_answer::DEFAULT_MODEL.to_string()
}

fn default_media_base_url() -> String {
    "rtmp://127.0.0.1:1935".to_string()
}

fn default_ffmpeg_bin() -> String {
    "ffmpeg".to_string()
}

#[derive(Deserialize)]
pub struct Env {
    #[serde(default = "default_port")]
    pub port: u16,

    pub stt_api_base: String,
    #[serde(default)]
    pub stt_api_key: Option<String>,

    pub ocr_api_base: String,
    #[serde(default)]
    pub ocr_api_key: Option<String>,

    #[serde(default = "default_answer_api_base")]
    pub answer_api_base: String,
    #[serde(default)]
    pub answer_api_key: Option<String>,
    #[serde(default = "default_answer_model")]
    pub answer_model: String,

    #[serde(default = "default_media_base_url")]
    pub media_base_url: String,
    #[serde(default = "default_ffmpeg_bin")]
    pub ffmpeg_bin: String,
}

static ENV: OnceLock<Env> = OnceLock::new();

pub fn env() -> &'static Env {
    ENV.get_or_init(|| {
        let _ = dotenvy::dotenv();
        envy::from_env().expect("Failed to load environment")
    })
}
