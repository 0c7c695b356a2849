// ── Change notification ──
//
// Callback listeners for synchronous consumers plus a `watch`-backed
// version counter for async ones. `notify` is only ever invoked from the
// dispatcher's deferred queue.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use indexmap::IndexMap;
use tokio::sync::watch;

/// Handle returned by `add_change_listener`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn() + Send + Sync>;

pub(crate) struct ChangeEmitter {
    listeners: Mutex<IndexMap<ListenerId, Listener>>,
    next_id: AtomicU64,
    version: watch::Sender<u64>,
}

impl ChangeEmitter {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        Self {
            listeners: Mutex::new(IndexMap::new()),
            next_id: AtomicU64::new(0),
            version,
        }
    }

    pub(crate) fn add(&self, listener: impl Fn() + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(listener));
        id
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(&id)
            .is_some()
    }

    /// Bump the version and call every listener in subscription order.
    pub(crate) fn notify(&self) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.version.send_modify(|v| *v = v.wrapping_add(1));

        // Snapshot first so listeners may add/remove listeners.
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener();
        }
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub(crate) fn subscribe(&self) -> StoreStream {
        StoreStream {
            rx: self.version.subscribe(),
        }
    }
}

/// Async change feed for one store.
///
/// Coalesces bursts: a receiver that falls behind sees a single wake-up for
/// any number of intermediate changes, then reads the store's getters.
pub struct StoreStream {
    rx: watch::Receiver<u64>,
}

impl StoreStream {
    /// Wait for the next change. Returns `false` once the store is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Number of changes emitted so far.
    pub fn version(&self) -> u64 {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listeners_fire_in_order_and_can_be_removed() {
        let emitter = ChangeEmitter::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let l1 = Arc::clone(&log);
        let first = emitter.add(move || l1.lock().unwrap_or_else(PoisonError::into_inner).push(1));
        let l2 = Arc::clone(&log);
        emitter.add(move || l2.lock().unwrap_or_else(PoisonError::into_inner).push(2));

        emitter.notify();
        assert!(emitter.remove(first));
        emitter.notify();

        assert_eq!(*log.lock().unwrap_or_else(PoisonError::into_inner), vec![1, 2, 2]);
        assert_eq!(emitter.version(), 2);
    }

    #[tokio::test]
    async fn stream_wakes_on_notify() {
        let emitter = ChangeEmitter::new();
        let mut stream = emitter.subscribe();

        emitter.notify();
        emitter.notify();

        assert!(stream.changed().await);
        assert_eq!(stream.version(), 2);
    }
}
