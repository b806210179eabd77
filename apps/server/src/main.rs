mod env;

use std::net::SocketAddr;

use tracing_subscriber::prelude::*;

use murmur_answer::AnswerClient;
use murmur_ocr::OcrClient;
use murmur_relay::{RelayConfig, RelayState, router};
use murmur_stt::RecognizeClient;

use env::env;

fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let env = env();

    // Startup config errors are the only failures allowed to take the
    // process down.
    let mut stt = RecognizeClient::builder().api_base(&env.stt_api_base);
    if let Some(key) = &env.stt_api_key {
        stt = stt.api_key(key);
    }
    let stt = stt.build().expect("invalid STT_API_BASE");

    let mut ocr = OcrClient::new(&env.ocr_api_base);
    if let Some(key) = &env.ocr_api_key {
        ocr = ocr.with_api_key(key);
    }

    let mut answer = AnswerClient::new(&env.answer_api_base).with_model(&env.answer_model);
    if let Some(key) = &env.answer_api_key {
        answer = answer.with_api_key(key);
    }

    let config = RelayConfig {
        audio_endpoint_url: format!("ws://127.0.0.1:{}/transcribe", env.port),
        media_base_url: env.media_base_url.clone(),
        ffmpeg_bin: env.ffmpeg_bin.clone(),
    };
    let state = RelayState::new(config, stt, ocr, answer);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let addr = SocketAddr::from(([0, 0, 0, 0], env.port));
            tracing::info!(addr = %addr, "server_listening");

            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .expect("failed to bind listening port");
            axum::serve(listener, router(state))
                .with_graceful_shutdown(shutdown_signal())
                .await
                .expect("server error");
        });

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
    tracing::info!("shutdown_signal_received");
}
