// ── Session state ──

use tokio::sync::watch;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionState {
    Active,
    /// The server answered 401; the user must log in again.
    Expired,
}

/// Shared session flag. Any action receiving a 401 flips it to `Expired`;
/// front-ends watch it and send the user back to login.
#[derive(Debug, Clone)]
pub struct Session {
    tx: watch::Sender<SessionState>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionState::Active);
        Self { tx }
    }

    pub fn state(&self) -> SessionState {
        *self.tx.borrow()
    }

    pub fn is_expired(&self) -> bool {
        self.state() == SessionState::Expired
    }

    pub fn expire(&self) {
        let changed = self.tx.send_if_modified(|state| {
            let was_active = *state == SessionState::Active;
            *state = SessionState::Expired;
            was_active
        });
        if changed {
            warn!("session expired, login required");
        }
    }

    pub fn activate(&self) {
        self.tx.send_if_modified(|state| {
            let was_expired = *state == SessionState::Expired;
            *state = SessionState::Active;
            was_expired
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expire_is_idempotent_and_observable() {
        let session = Session::new();
        let mut rx = session.subscribe();
        assert_eq!(session.state(), SessionState::Active);

        session.expire();
        assert!(rx.has_changed().unwrap_or(false));
        rx.borrow_and_update();

        session.expire();
        assert!(!rx.has_changed().unwrap_or(true));
        assert!(session.is_expired());

        session.activate();
        assert_eq!(session.state(), SessionState::Active);
    }
}
