// ── In-flight request tracking ──

use tokio::sync::watch;

/// Counts requests currently in flight. Front-ends watch it to drive a
/// spinner or progress bar.
#[derive(Debug, Clone)]
pub struct Loader {
    tx: watch::Sender<usize>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self { tx }
    }

    /// Mark one request as started. Dropping the guard marks it done.
    #[must_use = "the request is only counted while the guard is alive"]
    pub fn loading(&self) -> LoaderGuard {
        self.tx.send_modify(|n| *n += 1);
        LoaderGuard {
            tx: self.tx.clone(),
        }
    }

    pub fn in_flight(&self) -> usize {
        *self.tx.borrow()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight() > 0
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.tx.subscribe()
    }
}

#[derive(Debug)]
pub struct LoaderGuard {
    tx: watch::Sender<usize>,
}

impl Drop for LoaderGuard {
    fn drop(&mut self) {
        self.tx.send_modify(|n| *n = n.saturating_sub(1));
    }
}
