//! Push/pull bridge between socket-delivered audio chunks and the pull-based
//! transcription consumer.
//!
//! The producer side is a socket message handler that must never block, so
//! `push` always completes immediately: the chunk is handed to a waiting
//! consumer if one is parked, otherwise appended to an unbounded backlog.
//! Backlog growth under a momentarily slow recognition service is the
//! intended release valve, not an error.
//!
//! Intended for one logical consumer at a time (the active transcription
//! session). Multiple parked pulls are still served safely, strictly FIFO.

use std::collections::VecDeque;
use std::sync::Mutex;

use bytes::Bytes;
use tokio::sync::oneshot;

#[derive(Default)]
struct Inner {
    backlog: VecDeque<Bytes>,
    waiters: VecDeque<oneshot::Sender<Option<Bytes>>>,
    closed: bool,
}

/// FIFO chunk queue with exactly-once delivery and an exactly-once
/// end-of-stream signal per pull.
#[derive(Default)]
pub struct ChunkQueue {
    inner: Mutex<Inner>,
}

impl ChunkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue one chunk, or hand it directly to a parked consumer.
    /// No-op once the queue is closed.
    pub fn push(&self, chunk: Bytes) {
        let mut inner = self.inner.lock().expect("chunk queue poisoned");
        if inner.closed {
            return;
        }

        let mut chunk = chunk;
        while let Some(waiter) = inner.waiters.pop_front() {
            match waiter.send(Some(chunk)) {
                Ok(()) => return,
                // Pull future was dropped before resolution. Reclaim the
                // chunk and try the next waiter so nothing is lost.
                Err(reclaimed) => chunk = reclaimed.expect("waiter resolved with Some"),
            }
        }
        inner.backlog.push_back(chunk);
    }

    /// Mark the stream ended. Every parked pull resolves with end-of-stream
    /// now; every future pull resolves with end-of-stream once the backlog
    /// is drained. Idempotent.
    pub fn close(&self) {
        let mut inner = self.inner.lock().expect("chunk queue poisoned");
        inner.closed = true;
        while let Some(waiter) = inner.waiters.pop_front() {
            let _ = waiter.send(None);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().expect("chunk queue poisoned").closed
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("chunk queue poisoned").backlog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the next chunk, suspending until one arrives. Returns `None`
    /// exactly once per call after `close` (and the backlog is drained).
    pub async fn pull(&self) -> Option<Bytes> {
        let rx = {
            let mut inner = self.inner.lock().expect("chunk queue poisoned");
            if let Some(chunk) = inner.backlog.pop_front() {
                return Some(chunk);
            }
            if inner.closed {
                return None;
            }
            let (tx, rx) = oneshot::channel();
            inner.waiters.push_back(tx);
            rx
        };

        // Sender is only dropped with the queue itself; treat that as
        // end-of-stream too.
        rx.await.unwrap_or(None)
    }
}
