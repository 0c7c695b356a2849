// ── Store layer ──
//
// One `Store<R>` per resource collection and one `DocumentStore<D>` per
// singleton document or unit view. Stores mutate only inside their dispatcher callback
// and notify listeners from the dispatcher's deferred queue.

mod document;
mod emitter;
mod resource;

pub use document::{DocumentStore, Selector};
pub use emitter::{ListenerId, StoreStream};
pub use resource::{DEFAULT_PAGE_COUNT, Store};
