//! Unidirectional data layer for the Nimbus cloud console.
//!
//! Sits between `nimbus-api` and a front-end (the `nimbus` CLI, or any
//! other consumer):
//!
//! - **[`Console`]** is the application root. It owns the API client, the
//!   dispatchers, and one store plus one action module per resource kind.
//!
//! - **[`Dispatcher`]** fans every [`Message`] out synchronously, in
//!   registration order, to the store callbacks. Store change
//!   notifications are deferred until the whole fan-out has completed.
//!
//! - **[`Store<R>`]** holds the last synced page of one collection as an
//!   immutable snapshot: items, id index, page, filter and count.
//!
//! - **[`Actions<R>`]** issues the REST calls. On success it dispatches the
//!   result. On failure it raises an [`Alert`] or flags the [`Session`] as
//!   expired. Out-of-order sync responses are dropped.
//!
//! - **[`EventDispatcher`]** relays server-pushed `<kind>.change` events.
//!   Each action module re-syncs when its own kind changes.

#[macro_use]
mod resources;

pub mod actions;
pub mod alert;
pub mod config;
pub mod console;
pub mod dispatch;
pub mod error;
pub mod loader;
pub mod model;
pub mod selection;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use actions::{ActionContext, Actions, DocumentActions, UnitActions, UnitHost};
pub use alert::{Alert, AlertCenter, AlertLevel};
pub use config::{ConsoleConfig, TlsVerification};
pub use console::{
    Console, DocumentSlot, Registered, Registry, ResourceVisitor, Slot, UnitSlot,
};
pub use dispatch::{
    Action, ChangeEvent, Deferred, DispatchToken, Dispatcher, DocumentAction, EventDispatcher,
    Message,
};
pub use error::CoreError;
pub use loader::{Loader, LoaderGuard};
pub use selection::Selection;
pub use session::{Session, SessionState};
pub use store::{DEFAULT_PAGE_COUNT, DocumentStore, ListenerId, Store, StoreStream};

pub use model::{Document, Filter, Resource, ResourceKind, Scope};
