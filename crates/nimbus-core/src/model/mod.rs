// ── Domain model ──
//
// Plain records mirroring the management API's JSON, one per resource
// collection, plus the kind enum and the traits that tie a record type to
// its REST path and its dispatch message variant.

mod compute;
mod filter;
mod identity;
mod infrastructure;
mod network;
mod system;

use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;
use strum::IntoEnumIterator;

use crate::dispatch::{Action, DocumentAction, Message};

pub use compute::{
    Deployment, Disk, Image, Instance, Pod, PodUnit, Service, Spec, SpecPage, UnitDetail,
};
pub use filter::{Filter, Scope};
pub use identity::{Authority, Certificate, Organization, Policy, PolicyRule, Secret, User};
pub use infrastructure::{Datacenter, Node, NodeInit, Plan, Pool, Shape, Storage, Zone};
pub use network::{
    Balancer, BalancerBackend, BalancerDomain, BalancerState, Block, Domain, DomainRecord,
    Firewall, FirewallRule, Vpc, VpcRoute,
};
pub use system::{Log, Settings, Subscription};

/// Server fields a record type does not model, preserved so that a
/// fetched record can be committed back without losing data.
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// A record held in a paginated store.
///
/// Implemented for every model type by the resource registry; the
/// associated `KIND` drives URL construction, alert wording and change-event
/// routing, and the message hooks let a generic store pick its own variant
/// out of the shared [`Message`] sum type.
pub trait Resource:
    Debug + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: ResourceKind;

    fn id(&self) -> &str;

    /// Short human-readable label (usually the name).
    fn label(&self) -> &str;

    fn into_message(action: Action<Self>) -> Message;

    fn from_message(message: &Message) -> Option<&Action<Self>>;
}

/// A singleton document (settings, subscription) rather than a collection.
pub trait Document:
    Debug + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// REST path, e.g. `"settings"`.
    const PATH: &'static str;

    /// Noun used in alert messages.
    const NOUN: &'static str;

    fn into_message(action: DocumentAction<Self>) -> Message;

    fn from_message(message: &Message) -> Option<&DocumentAction<Self>>;
}

macro_rules! define_kinds {
    ($(
        $ty:ident => $accessor:ident {
            path: $path:literal, key: $key:literal,
            singular: $singular:literal, plural: $plural:literal, label: $label:ident,
        }
    ),* $(,)?) => {
        /// Every resource collection managed by the console.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            strum::Display, strum::EnumIter, strum::EnumString, strum::IntoStaticStr,
            serde::Serialize, serde::Deserialize,
        )]
        #[strum(serialize_all = "snake_case", ascii_case_insensitive)]
        #[serde(rename_all = "snake_case")]
        pub enum ResourceKind {
            $($ty),*
        }

        impl ResourceKind {
            /// REST collection path without leading slash.
            pub fn path(self) -> &'static str {
                match self {
                    $(Self::$ty => $path),*
                }
            }

            /// Field that holds the items in a list response body.
            pub fn list_key(self) -> &'static str {
                match self {
                    $(Self::$ty => $key),*
                }
            }

            pub fn singular(self) -> &'static str {
                match self {
                    $(Self::$ty => $singular),*
                }
            }

            pub fn plural(self) -> &'static str {
                match self {
                    $(Self::$ty => $plural),*
                }
            }
        }

        $(
            impl Resource for $ty {
                const KIND: ResourceKind = ResourceKind::$ty;

                fn id(&self) -> &str {
                    &self.id
                }

                fn label(&self) -> &str {
                    &self.$label
                }

                fn into_message(action: Action<Self>) -> Message {
                    Message::$ty(action)
                }

                fn from_message(message: &Message) -> Option<&Action<Self>> {
                    match message {
                        Message::$ty(action) => Some(action),
                        _ => None,
                    }
                }
            }
        )*
    };
}

for_each_resource!(define_kinds);

impl ResourceKind {
    /// Server-pushed event type announcing that this collection changed.
    pub fn change_event(self) -> String {
        format!("{}.change", self.path())
    }

    /// Kind served under the REST collection `path`.
    pub fn from_path(path: &str) -> Option<Self> {
        Self::iter().find(|kind| kind.path() == path)
    }

    /// Map a `"<path>.change"` event type back to its kind.
    pub fn from_change_event(event_type: &str) -> Option<Self> {
        Self::from_path(event_type.strip_suffix(".change")?)
    }
}

impl Document for Settings {
    const PATH: &'static str = "settings";
    const NOUN: &'static str = "settings";

    fn into_message(action: DocumentAction<Self>) -> Message {
        Message::Settings(action)
    }

    fn from_message(message: &Message) -> Option<&DocumentAction<Self>> {
        match message {
            Message::Settings(action) => Some(action),
            _ => None,
        }
    }
}

impl Document for Subscription {
    const PATH: &'static str = "subscription";
    const NOUN: &'static str = "subscription";

    fn into_message(action: DocumentAction<Self>) -> Message {
        Message::Subscription(action)
    }

    fn from_message(message: &Message) -> Option<&DocumentAction<Self>> {
        match message {
            Message::Subscription(action) => Some(action),
            _ => None,
        }
    }
}
