// ── Dispatch messages ──

use std::sync::Arc;

use crate::model::{
    Authority, Balancer, Block, Certificate, Datacenter, Disk, Domain, Filter, Firewall, Image,
    Instance, Log, Node, Organization, Plan, Pod, Policy, Pool, ResourceKind, Scope, Secret,
    Service, Settings, Shape, Storage, Subscription, UnitDetail, User, Vpc, Zone,
};

/// A state change for one resource collection.
#[derive(Debug, Clone)]
pub enum Action<R> {
    /// Replace the current page with freshly fetched items.
    Sync { items: Arc<[Arc<R>]>, count: u64 },

    /// Replace one scoped listing (names, zones of a datacenter, ...).
    SyncScoped { scope: Scope, items: Arc<[Arc<R>]> },

    /// Move to another page. Clamped by the store.
    Traverse { page: u64 },

    /// Replace the active filter (`None` clears it).
    Filter { filter: Option<Filter> },
}

impl<R> Action<R> {
    /// Wrap owned items for a `Sync`.
    pub fn sync(items: Vec<R>, count: u64) -> Self {
        Self::Sync {
            items: items.into_iter().map(Arc::new).collect(),
            count,
        }
    }

    pub fn sync_scoped(scope: Scope, items: Vec<R>) -> Self {
        Self::SyncScoped {
            scope,
            items: items.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sync { .. } => "sync",
            Self::SyncScoped { .. } => "sync_scoped",
            Self::Traverse { .. } => "traverse",
            Self::Filter { .. } => "filter",
        }
    }
}

/// A state change for a singleton document.
#[derive(Debug, Clone)]
pub enum DocumentAction<D> {
    Sync(Arc<D>),
}

macro_rules! define_messages {
    ($(
        $ty:ident => $accessor:ident { $($rest:tt)* }
    ),* $(,)?) => {
        /// Everything that can flow through the [`Dispatcher`](super::Dispatcher).
        ///
        /// Each store matches on its own variant and ignores the rest;
        /// `Reset` is observed by every store.
        #[derive(Debug, Clone)]
        pub enum Message {
            /// Clear every store back to defaults (logout, session change).
            Reset,
            $($ty(Action<$ty>),)*
            Settings(DocumentAction<Settings>),
            Subscription(DocumentAction<Subscription>),
            /// The pod unit currently being inspected.
            PodUnit(DocumentAction<UnitDetail>),
            /// The service unit currently being inspected.
            ServiceUnit(DocumentAction<UnitDetail>),
        }

        impl Message {
            /// Resource collection targeted by this message, if any.
            pub fn kind(&self) -> Option<ResourceKind> {
                match self {
                    $(Self::$ty(_) => Some(ResourceKind::$ty),)*
                    Self::Reset
                    | Self::Settings(_)
                    | Self::Subscription(_)
                    | Self::PodUnit(_)
                    | Self::ServiceUnit(_) => None,
                }
            }

            /// Short action label for logging.
            pub fn action_name(&self) -> &'static str {
                match self {
                    Self::Reset => "reset",
                    $(Self::$ty(action) => action.name(),)*
                    Self::Settings(_)
                    | Self::Subscription(_)
                    | Self::PodUnit(_)
                    | Self::ServiceUnit(_) => "sync",
                }
            }
        }
    };
}

for_each_resource!(define_messages);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_label() {
        let msg = Message::Firewall(Action::Filter { filter: None });
        assert_eq!(msg.kind(), Some(ResourceKind::Firewall));
        assert_eq!(msg.action_name(), "filter");
        assert_eq!(Message::Reset.kind(), None);
        assert_eq!(Message::Reset.action_name(), "reset");
    }

    #[test]
    fn sync_wraps_items() {
        let action = Action::sync(vec![Zone::default(), Zone::default()], 7);
        match action {
            Action::Sync { items, count } => {
                assert_eq!(items.len(), 2);
                assert_eq!(count, 7);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
