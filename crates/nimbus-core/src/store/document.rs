// ── Singleton document store ──

use std::sync::{Arc, Weak};

use arc_swap::ArcSwapOption;

use super::emitter::{ChangeEmitter, ListenerId, StoreStream};
use crate::dispatch::{Deferred, DispatchToken, Dispatcher, DocumentAction, Message};
use crate::model::Document;

/// Picks a store's own variant out of the shared [`Message`] type.
pub type Selector<D> = fn(&Message) -> Option<&DocumentAction<D>>;

/// Holds the last synced copy of a singleton document (settings,
/// subscription, the unit being inspected). Empty until the first sync.
pub struct DocumentStore<D> {
    current: ArcSwapOption<D>,
    emitter: ChangeEmitter,
    token: DispatchToken,
}

impl<D: Document> DocumentStore<D> {
    pub fn new(dispatcher: &Dispatcher) -> Arc<Self> {
        Self::with_selector(dispatcher, D::from_message)
    }
}

impl<D: Clone + Send + Sync + 'static> DocumentStore<D> {
    /// Build a store fed by whichever message variant `select` accepts.
    pub fn with_selector(dispatcher: &Dispatcher, select: Selector<D>) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let token = dispatcher.register(move |message, deferred| {
                if let Some(store) = weak.upgrade() {
                    store.handle(message, select, deferred);
                }
            });
            Self {
                current: ArcSwapOption::empty(),
                emitter: ChangeEmitter::new(),
                token,
            }
        })
    }

    pub fn dispatch_token(&self) -> DispatchToken {
        self.token
    }

    pub fn get(&self) -> Option<Arc<D>> {
        self.current.load_full()
    }

    /// Owned copy for editing.
    pub fn get_mut(&self) -> Option<D> {
        self.get().map(|doc| D::clone(&doc))
    }

    pub fn add_change_listener(&self, listener: impl Fn() + Send + Sync + 'static) -> ListenerId {
        self.emitter.add(listener)
    }

    pub fn remove_change_listener(&self, id: ListenerId) -> bool {
        self.emitter.remove(id)
    }

    pub fn subscribe(&self) -> StoreStream {
        self.emitter.subscribe()
    }

    fn handle(self: &Arc<Self>, message: &Message, select: Selector<D>, deferred: &mut Deferred) {
        match (message, select(message)) {
            (Message::Reset, _) => self.current.store(None),
            (_, Some(DocumentAction::Sync(doc))) => self.current.store(Some(Arc::clone(doc))),
            _ => return,
        }

        let store = Arc::clone(self);
        deferred.defer(move || store.emitter.notify());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Settings, Subscription, UnitDetail};

    #[test]
    fn sync_and_reset() {
        let dispatcher = Dispatcher::new();
        let settings = DocumentStore::<Settings>::new(&dispatcher);
        let subscription = DocumentStore::<Subscription>::new(&dispatcher);

        assert!(settings.get().is_none());

        let doc = Settings {
            auth_admin_expire: 1440,
            ..Settings::default()
        };
        dispatcher.dispatch(Message::Settings(DocumentAction::Sync(Arc::new(doc))));

        assert_eq!(settings.get().unwrap().auth_admin_expire, 1440);
        assert!(subscription.get().is_none());

        dispatcher.dispatch(Message::Reset);
        assert!(settings.get().is_none());
    }

    fn pod_unit(message: &Message) -> Option<&DocumentAction<UnitDetail>> {
        match message {
            Message::PodUnit(action) => Some(action),
            _ => None,
        }
    }

    fn service_unit(message: &Message) -> Option<&DocumentAction<UnitDetail>> {
        match message {
            Message::ServiceUnit(action) => Some(action),
            _ => None,
        }
    }

    #[test]
    fn selector_routes_unit_variants() {
        let dispatcher = Dispatcher::new();
        let pod_units = DocumentStore::with_selector(&dispatcher, pod_unit);
        let service_units = DocumentStore::with_selector(&dispatcher, service_unit);

        let unit = UnitDetail {
            id: "u1".into(),
            ..UnitDetail::default()
        };
        dispatcher.dispatch(Message::PodUnit(DocumentAction::Sync(Arc::new(unit))));

        assert_eq!(pod_units.get().unwrap().id, "u1");
        assert!(service_units.get().is_none());

        dispatcher.dispatch(Message::Reset);
        assert!(pod_units.get().is_none());
    }
}
