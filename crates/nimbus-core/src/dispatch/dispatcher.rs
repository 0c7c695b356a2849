// ── Synchronous message fan-out ──
//
// Every store registers one callback. `dispatch` walks the callbacks in
// registration order on the caller's thread, then drains the deferred
// queue the callbacks filled. A dispatch issued from inside a callback (or
// from a deferred notification) on the dispatching thread is queued and
// delivered once the current fan-out finishes; dispatches from other
// threads wait for the running fan-out to complete.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, ThreadId};

use tracing::{debug, trace, warn};

use super::message::Message;

/// Handle returned by [`Dispatcher::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DispatchToken(u64);

type Callback = Arc<dyn Fn(&Message, &mut Deferred) + Send + Sync>;

/// Work scheduled by callbacks to run after the whole fan-out completes.
///
/// Stores push their change notifications here so that listeners never
/// observe a dispatch that only some stores have applied.
#[derive(Default)]
pub struct Deferred {
    queue: Vec<Box<dyn FnOnce() + Send>>,
}

impl Deferred {
    pub fn defer(&mut self, f: impl FnOnce() + Send + 'static) {
        self.queue.push(Box::new(f));
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn run(self) {
        for f in self.queue {
            f();
        }
    }
}

#[derive(Default)]
struct DispatchState {
    active: Option<ThreadId>,
    pending: VecDeque<Message>,
}

/// Central broadcaster of [`Message`]s to registered store callbacks.
#[derive(Default)]
pub struct Dispatcher {
    callbacks: RwLock<Vec<(DispatchToken, Callback)>>,
    next_token: AtomicU64,
    gate: Mutex<()>,
    state: Mutex<DispatchState>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. It receives every dispatched message.
    pub fn register<F>(&self, callback: F) -> DispatchToken
    where
        F: Fn(&Message, &mut Deferred) + Send + Sync + 'static,
    {
        let token = DispatchToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((token, Arc::new(callback)));
        trace!(?token, "dispatch callback registered");
        token
    }

    /// Remove a callback. Returns `false` if the token was unknown.
    pub fn unregister(&self, token: DispatchToken) -> bool {
        let mut callbacks = self
            .callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = callbacks.len();
        callbacks.retain(|(t, _)| *t != token);
        before != callbacks.len()
    }

    pub fn len(&self) -> usize {
        self.callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `message` to every registered callback.
    pub fn dispatch(&self, message: Message) {
        let current = thread::current().id();

        {
            let mut state = self.lock_state();
            if state.active == Some(current) {
                trace!(
                    kind = ?message.kind(),
                    action = message.action_name(),
                    "nested dispatch queued"
                );
                state.pending.push_back(message);
                return;
            }
        }

        let _gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        self.lock_state().active = Some(current);
        let _active = ActiveGuard(self);

        let mut next = Some(message);
        while let Some(message) = next {
            self.fan_out(&message);
            next = self.lock_state().pending.pop_front();
        }
    }

    fn fan_out(&self, message: &Message) {
        let callbacks: Vec<Callback> = self
            .callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        debug!(
            kind = ?message.kind(),
            action = message.action_name(),
            callbacks = callbacks.len(),
            "dispatch"
        );

        let mut deferred = Deferred::default();
        for callback in &callbacks {
            callback(message, &mut deferred);
        }
        deferred.run();
    }

    fn lock_state(&self) -> MutexGuard<'_, DispatchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the active-thread marker even if a callback panics.
struct ActiveGuard<'a>(&'a Dispatcher);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.0.lock_state();
        if !state.pending.is_empty() && thread::panicking() {
            warn!(
                dropped = state.pending.len(),
                "dropping queued dispatches after callback panic"
            );
            state.pending.clear();
        }
        state.active = None;
    }
}
