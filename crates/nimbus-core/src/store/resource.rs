// ── Paginated resource store ──
//
// Holds the last synced page of one collection as an immutable snapshot.
// Readers load the snapshot lock-free; only the dispatcher callback swaps
// in a new one.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::trace;

use super::emitter::{ChangeEmitter, ListenerId, StoreStream};
use crate::dispatch::{Action, Deferred, DispatchToken, Dispatcher, Message};
use crate::model::{Filter, Resource, Scope};

/// Page size used when none is configured.
pub const DEFAULT_PAGE_COUNT: u64 = 20;

struct StoreState<R> {
    items: Arc<[Arc<R>]>,
    index: HashMap<String, usize>,
    page: u64,
    count: u64,
    filter: Option<Filter>,
    scoped: HashMap<Scope, Arc<[Arc<R>]>>,
}

impl<R> Default for StoreState<R> {
    fn default() -> Self {
        Self {
            items: Arc::from(Vec::new()),
            index: HashMap::new(),
            page: 0,
            count: 0,
            filter: None,
            scoped: HashMap::new(),
        }
    }
}

impl<R> Clone for StoreState<R> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            index: self.index.clone(),
            page: self.page,
            count: self.count,
            filter: self.filter.clone(),
            scoped: self.scoped.clone(),
        }
    }
}

fn pages(count: u64, page_count: u64) -> u64 {
    if page_count == 0 {
        0
    } else {
        count.div_ceil(page_count)
    }
}

/// Cached state for one resource collection.
pub struct Store<R: Resource> {
    state: ArcSwap<StoreState<R>>,
    page_count: u64,
    emitter: ChangeEmitter,
    token: DispatchToken,
}

impl<R: Resource> Store<R> {
    /// Create a store and register its callback with `dispatcher`.
    ///
    /// A `page_count` of zero falls back to [`DEFAULT_PAGE_COUNT`].
    pub fn new(dispatcher: &Dispatcher, page_count: u64) -> Arc<Self> {
        let page_count = if page_count == 0 {
            DEFAULT_PAGE_COUNT
        } else {
            page_count
        };

        Arc::new_cyclic(|weak: &std::sync::Weak<Self>| {
            let weak = weak.clone();
            let token = dispatcher.register(move |message, deferred| {
                if let Some(store) = weak.upgrade() {
                    store.handle(message, deferred);
                }
            });
            Self {
                state: ArcSwap::from_pointee(StoreState::default()),
                page_count,
                emitter: ChangeEmitter::new(),
                token,
            }
        })
    }

    pub fn dispatch_token(&self) -> DispatchToken {
        self.token
    }

    // ── Getters ──────────────────────────────────────────────────────

    /// Current page of items, in server order.
    pub fn items(&self) -> Arc<[Arc<R>]> {
        Arc::clone(&self.state.load().items)
    }

    /// Owned copies of the current page, for editing.
    pub fn items_mut(&self) -> Vec<R> {
        self.state
            .load()
            .items
            .iter()
            .map(|item| R::clone(item))
            .collect()
    }

    pub fn page(&self) -> u64 {
        self.state.load().page
    }

    pub fn page_count(&self) -> u64 {
        self.page_count
    }

    /// `ceil(count / page_count)`.
    pub fn pages(&self) -> u64 {
        pages(self.state.load().count, self.page_count)
    }

    pub fn filter(&self) -> Option<Filter> {
        self.state.load().filter.clone()
    }

    /// Total items across all pages as reported by the server.
    pub fn count(&self) -> u64 {
        self.state.load().count
    }

    pub fn len(&self) -> usize {
        self.state.load().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.load().items.is_empty()
    }

    /// Look up an item of the current page by id.
    pub fn resource(&self, id: &str) -> Option<Arc<R>> {
        let state = self.state.load();
        let i = *state.index.get(id)?;
        state.items.get(i).cloned()
    }

    /// Owned copy of one item, for editing.
    pub fn resource_mut(&self, id: &str) -> Option<R> {
        self.resource(id).map(|item| R::clone(&item))
    }

    /// Last synced scoped listing, if any.
    pub fn scoped(&self, scope: &Scope) -> Option<Arc<[Arc<R>]>> {
        self.state.load().scoped.get(scope).cloned()
    }

    /// Query pairs describing the current filter and page.
    pub fn list_query(&self) -> Vec<(String, String)> {
        let state = self.state.load();
        let mut query = state
            .filter
            .as_ref()
            .map(Filter::to_query)
            .unwrap_or_default();
        query.push(("page".to_owned(), state.page.to_string()));
        query.push(("page_count".to_owned(), self.page_count.to_string()));
        query
    }

    // ── Change subscription ──────────────────────────────────────────

    pub fn add_change_listener(&self, listener: impl Fn() + Send + Sync + 'static) -> ListenerId {
        self.emitter.add(listener)
    }

    pub fn remove_change_listener(&self, id: ListenerId) -> bool {
        self.emitter.remove(id)
    }

    pub fn subscribe(&self) -> StoreStream {
        self.emitter.subscribe()
    }

    /// Number of change notifications emitted so far.
    pub fn version(&self) -> u64 {
        self.emitter.version()
    }

    // ── Dispatcher callback ──────────────────────────────────────────

    fn handle(self: &Arc<Self>, message: &Message, deferred: &mut Deferred) {
        if matches!(message, Message::Reset) {
            self.state.store(Arc::new(StoreState::default()));
        } else if let Some(action) = R::from_message(message) {
            self.apply(action);
        } else {
            return;
        }

        trace!(
            kind = %R::KIND,
            action = message.action_name(),
            "store updated"
        );
        let store = Arc::clone(self);
        deferred.defer(move || store.emitter.notify());
    }

    fn apply(&self, action: &Action<R>) {
        let mut next = StoreState::clone(&self.state.load());

        match action {
            Action::Sync { items, count } => {
                next.index = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| (item.id().to_owned(), i))
                    .collect();
                next.items = Arc::clone(items);
                next.count = *count;
                next.page = next.page.min(pages(next.count, self.page_count));
            }
            Action::SyncScoped { scope, items } => {
                next.scoped.insert(scope.clone(), Arc::clone(items));
            }
            Action::Traverse { page } => {
                next.page = (*page).min(pages(next.count, self.page_count));
            }
            Action::Filter { filter } => {
                next.page = if Filter::resets_page(next.filter.as_ref(), filter.as_ref()) {
                    0
                } else {
                    next.page.min(pages(next.count, self.page_count))
                };
                next.filter = filter.clone();
            }
        }

        self.state.store(Arc::new(next));
    }
}
