// ── Action layer ──
//
// Each action performs one HTTP request and, on success, dispatches what
// happened. Failures follow one policy everywhere:
//
// - 401: flag the session as expired and resolve `Ok(())`
// - superseded sync: drop the response and resolve `Ok(())`
// - anything else: publish an alert and return the error

mod document;
mod resource;
mod unit;

use std::sync::{Arc, Mutex, PoisonError};

use nimbus_api::ApiClient;
use tracing::debug;
use uuid::Uuid;

use crate::alert::AlertCenter;
use crate::dispatch::Dispatcher;
use crate::error::CoreError;
use crate::loader::Loader;
use crate::session::Session;

pub use document::DocumentActions;
pub use resource::Actions;
pub use unit::{SPEC_PAGE_COUNT, UnitActions, UnitHost};

/// Shared collaborators handed to every action module.
pub struct ActionContext {
    pub client: Arc<ApiClient>,
    pub dispatcher: Arc<Dispatcher>,
    pub alerts: AlertCenter,
    pub loader: Loader,
    pub session: Session,
}

impl ActionContext {
    /// Apply the failure policy to a finished request.
    ///
    /// `Ok(None)` means the session expired and the caller should resolve
    /// quietly.
    pub(crate) fn settle<T>(
        &self,
        result: Result<T, nimbus_api::Error>,
        context: &str,
    ) -> Result<Option<T>, CoreError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_session_expired() => {
                self.session.expire();
                Ok(None)
            }
            Err(e) => {
                self.alerts.error_response(context, &e);
                Err(e.into())
            }
        }
    }

    /// Like [`settle`](Self::settle), but a response whose sync was
    /// superseded is dropped before any alert is raised. Session expiry
    /// still wins over staleness.
    pub(crate) fn settle_sync<T>(
        &self,
        result: Result<T, nimbus_api::Error>,
        latest: &SyncToken,
        token: Uuid,
        context: &str,
    ) -> Result<Option<T>, CoreError> {
        if matches!(&result, Err(e) if e.is_session_expired()) {
            return self.settle(result, context);
        }
        if !latest.is_current(token) {
            debug!(context, "dropping superseded response");
            return Ok(None);
        }
        self.settle(result, context)
    }
}

/// "Latest request wins" marker.
///
/// Each sync stamps a fresh id here before sending; when the response
/// arrives it is applied only if no newer sync has restamped the slot.
#[derive(Debug, Default)]
pub(crate) struct SyncToken(Mutex<Uuid>);

impl SyncToken {
    pub(crate) fn begin(&self) -> Uuid {
        let id = Uuid::new_v4();
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = id;
        id
    }

    pub(crate) fn is_current(&self, id: Uuid) -> bool {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) == id
    }
}
