use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use murmur_answer::AnswerClient;
use murmur_audio_queue::ChunkQueue;
use murmur_ocr::OcrClient;
use murmur_stt::RecognizeClient;

use crate::broadcast::Broadcaster;
use crate::session;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// This relay's own audio endpoint, handed to bridge connectors spawned
    /// by publish notifications.
    pub audio_endpoint_url: String,
    /// Base joined with the published stream path to form the media URL.
    pub media_base_url: String,
    pub ffmpeg_bin: String,
}

/// All mutable relay state, owned by the instance and shared by handle so
/// multiple relays can coexist (tests run several side by side).
#[derive(Clone)]
pub struct RelayState {
    inner: Arc<StateInner>,
}

struct StateInner {
    config: RelayConfig,
    broadcaster: Broadcaster,
    muted: AtomicBool,
    audio: Mutex<Option<Arc<ChunkQueue>>>,
    stt: RecognizeClient,
    ocr: OcrClient,
    answer: AnswerClient,
}

impl RelayState {
    pub fn new(
        config: RelayConfig,
        stt: RecognizeClient,
        ocr: OcrClient,
        answer: AnswerClient,
    ) -> Self {
        Self {
            inner: Arc::new(StateInner {
                config,
                broadcaster: Broadcaster::default(),
                muted: AtomicBool::new(false),
                audio: Mutex::new(None),
                stt,
                ocr,
                answer,
            }),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.inner.config
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.inner.broadcaster
    }

    pub fn is_muted(&self) -> bool {
        self.inner.muted.load(Ordering::Relaxed)
    }

    pub fn set_muted(&self, muted: bool) {
        self.inner.muted.store(muted, Ordering::Relaxed);
    }

    pub(crate) fn ocr(&self) -> &OcrClient {
        &self.inner.ocr
    }

    pub(crate) fn answer(&self) -> &AnswerClient {
        &self.inner.answer
    }

    /// Queue for an audio-endpoint connection.
    ///
    /// When a queue is already live, a second concurrent producer shares it
    /// with no isolation (deliberately preserved single-stream behavior).
    /// Otherwise a fresh queue is installed and one transcription session is
    /// started against it; a new session therefore begins whenever the
    /// bridge reconnects after a drop.
    pub(crate) fn attach_audio_queue(&self) -> Arc<ChunkQueue> {
        let mut slot = self.inner.audio.lock().expect("audio slot poisoned");
        if let Some(queue) = slot.as_ref() {
            if !queue.is_closed() {
                return queue.clone();
            }
        }

        let queue = Arc::new(ChunkQueue::new());
        *slot = Some(queue.clone());
        tokio::spawn(session::run_transcription(
            queue.clone(),
            self.inner.stt.clone(),
            self.inner.broadcaster.clone(),
        ));
        queue
    }
}
