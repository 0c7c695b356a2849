// ── Dispatch layer ──
//
// `Dispatcher` carries state changes to stores; `EventDispatcher` carries
// server-side invalidations to action modules.

mod dispatcher;
mod event;
mod message;

pub use dispatcher::{Deferred, DispatchToken, Dispatcher};
pub use event::{ChangeEvent, EventDispatcher};
pub use message::{Action, DocumentAction, Message};
