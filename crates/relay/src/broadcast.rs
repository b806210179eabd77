use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use murmur_interface::UiEvent;

/// Serialize an event once for fan-out. A failure is logged and the event
/// dropped; it never tears a connection down.
pub(crate) fn encode(event: &UiEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(payload) => Some(payload),
        Err(error) => {
            tracing::warn!(%error, "failed to serialize ui event");
            None
        }
    }
}

/// Registry of live UI connections plus fan-out delivery.
///
/// Each connection gets an unbounded channel, so a slow consumer backs up
/// only its own channel and can never stall delivery to the others. Closed
/// channels are pruned on the next broadcast.
#[derive(Clone, Default)]
pub struct Broadcaster {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    clients: Mutex<HashMap<u64, mpsc::UnboundedSender<String>>>,
    next_id: AtomicU64,
}

pub struct Registration {
    pub id: u64,
    pub rx: mpsc::UnboundedReceiver<String>,
    /// The connection's own sender, for per-connection replies.
    pub tx: mpsc::UnboundedSender<String>,
}

impl Broadcaster {
    pub fn register(&self) -> Registration {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .clients
            .lock()
            .expect("client registry poisoned")
            .insert(id, tx.clone());
        Registration { id, rx, tx }
    }

    pub fn unregister(&self, id: u64) {
        self.inner
            .clients
            .lock()
            .expect("client registry poisoned")
            .remove(&id);
    }

    pub fn client_count(&self) -> usize {
        self.inner
            .clients
            .lock()
            .expect("client registry poisoned")
            .len()
    }

    /// Deliver to every registered client whose channel is still open,
    /// exactly once each; clients whose channel has closed are pruned
    /// instead of erroring.
    pub fn broadcast(&self, event: &UiEvent) {
        let Some(payload) = encode(event) else { return };
        self.inner
            .clients
            .lock()
            .expect("client registry poisoned")
            .retain(|_, tx| tx.send(payload.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_reaches_every_registered_client() {
        let broadcaster = Broadcaster::default();
        let mut a = broadcaster.register();
        let mut b = broadcaster.register();

        broadcaster.broadcast(&UiEvent::status("hello"));

        let expected = encode(&UiEvent::status("hello")).unwrap();
        assert_eq!(a.rx.recv().await.unwrap(), expected);
        assert_eq!(b.rx.recv().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn unregistered_client_receives_nothing_further() {
        let broadcaster = Broadcaster::default();
        let mut a = broadcaster.register();
        let b = broadcaster.register();

        broadcaster.unregister(b.id);
        broadcaster.broadcast(&UiEvent::status("after"));

        assert!(a.rx.recv().await.is_some());
        let mut b_rx = b.rx;
        assert!(b_rx.try_recv().is_err());
        assert_eq!(broadcaster.client_count(), 1);
    }

    #[tokio::test]
    async fn dropped_receiver_is_pruned_without_affecting_others() {
        let broadcaster = Broadcaster::default();
        let mut a = broadcaster.register();
        let b = broadcaster.register();
        drop(b.rx);

        broadcaster.broadcast(&UiEvent::status("still delivered"));

        assert!(a.rx.recv().await.is_some());
        assert_eq!(broadcaster.client_count(), 1);
    }

    #[tokio::test]
    async fn events_arrive_in_broadcast_order() {
        let broadcaster = Broadcaster::default();
        let mut a = broadcaster.register();

        broadcaster.broadcast(&UiEvent::transcript("one", true));
        broadcaster.broadcast(&UiEvent::transcript("one two", false));

        let first: serde_json::Value =
            serde_json::from_str(&a.rx.recv().await.unwrap()).unwrap();
        let second: serde_json::Value =
            serde_json::from_str(&a.rx.recv().await.unwrap()).unwrap();
        assert_eq!(first["transcript"], "one");
        assert_eq!(second["transcript"], "one two");
    }
}
