// ── Console: application root ──
//
// Owns one of everything: the API client, both dispatchers, a store and
// action module per resource kind, the pod and service unit views, and the
// alert/loader/session channels.
// Front-ends build exactly one `Console` and reach every collection
// through it.

use std::sync::{Arc, Mutex, PoisonError};

use nimbus_api::{ApiClient, EventHandle, ReconnectConfig};
use secrecy::ExposeSecret;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::actions::{ActionContext, Actions, DocumentActions, UnitActions, UnitHost};
use crate::alert::AlertCenter;
use crate::config::ConsoleConfig;
use crate::dispatch::{Dispatcher, EventDispatcher, Message};
use crate::error::CoreError;
use crate::loader::Loader;
use crate::model::{
    Authority, Balancer, Block, Certificate, Datacenter, Disk, Document, Domain, Firewall, Image,
    Instance, Log, Node, Organization, Plan, Pod, Policy, Pool, Resource, ResourceKind, Secret,
    Service, Settings, Shape, Storage, Subscription, UnitDetail, User, Vpc, Zone,
};
use crate::session::Session;
use crate::store::{DocumentStore, Store};

/// Store and actions for one resource kind.
pub struct Slot<R: Resource> {
    pub store: Arc<Store<R>>,
    pub actions: Arc<Actions<R>>,
}

impl<R: Resource> Slot<R> {
    fn new(ctx: &Arc<ActionContext>, page_count: u64) -> Self {
        let store = Store::new(&ctx.dispatcher, page_count);
        let actions = Arc::new(Actions::new(Arc::clone(ctx), Arc::clone(&store)));
        Self { store, actions }
    }
}

/// Store and actions for one singleton document.
pub struct DocumentSlot<D: Document> {
    pub store: Arc<DocumentStore<D>>,
    pub actions: Arc<DocumentActions<D>>,
}

impl<D: Document> DocumentSlot<D> {
    fn new(ctx: &Arc<ActionContext>) -> Self {
        let store = DocumentStore::new(&ctx.dispatcher);
        let actions = Arc::new(DocumentActions::new(Arc::clone(ctx), Arc::clone(&store)));
        Self { store, actions }
    }
}

/// Inspected-unit store and unit actions for one host kind.
pub struct UnitSlot<H: UnitHost> {
    pub store: Arc<DocumentStore<UnitDetail>>,
    pub actions: Arc<UnitActions<H>>,
}

impl<H: UnitHost> UnitSlot<H> {
    fn new(ctx: &Arc<ActionContext>) -> Self {
        let store = DocumentStore::with_selector(&ctx.dispatcher, H::unit_from_message);
        let actions = Arc::new(UnitActions::new(Arc::clone(ctx), Arc::clone(&store)));
        Self { store, actions }
    }
}

/// Resource types with a slot in the [`Registry`].
pub trait Registered: Resource {
    fn slot(registry: &Registry) -> &Slot<Self>;
}

/// Generic operation selected by a runtime [`ResourceKind`].
pub trait ResourceVisitor {
    type Output;

    fn visit<R: Registered>(self) -> Self::Output;
}

macro_rules! define_registry {
    ($(
        $ty:ident => $accessor:ident { $($rest:tt)* }
    ),* $(,)?) => {
        /// One [`Slot`] per resource kind.
        pub struct Registry {
            $(pub $accessor: Slot<$ty>,)*
        }

        impl Registry {
            fn new(ctx: &Arc<ActionContext>, page_count: u64) -> Self {
                Self {
                    $($accessor: Slot::new(ctx, page_count),)*
                }
            }

            fn listen(
                &self,
                events: &EventDispatcher,
                cancel: &CancellationToken,
            ) -> Vec<JoinHandle<()>> {
                vec![
                    $(Arc::clone(&self.$accessor.actions).listen(events, cancel.clone()),)*
                ]
            }
        }

        $(
            impl Registered for $ty {
                fn slot(registry: &Registry) -> &Slot<Self> {
                    &registry.$accessor
                }
            }
        )*

        impl ResourceKind {
            /// Run `visitor` with the record type of this kind.
            pub fn visit<V: ResourceVisitor>(self, visitor: V) -> V::Output {
                match self {
                    $(Self::$ty => visitor.visit::<$ty>(),)*
                }
            }
        }
    };
}

for_each_resource!(define_registry);

/// The application root.
pub struct Console {
    config: ConsoleConfig,
    ctx: Arc<ActionContext>,
    events: EventDispatcher,
    registry: Registry,
    settings: DocumentSlot<Settings>,
    subscription: DocumentSlot<Subscription>,
    pod_units: UnitSlot<Pod>,
    service_units: UnitSlot<Service>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    event_stream: Mutex<Option<EventHandle>>,
}

impl Console {
    /// Build the console and its HTTP client. No I/O happens here.
    pub fn new(config: ConsoleConfig) -> Result<Self, CoreError> {
        let client = ApiClient::new(config.url.clone(), &config.transport())?;
        Ok(Self::with_client(config, client))
    }

    /// Build around an existing client (custom transport, tests).
    pub fn with_client(config: ConsoleConfig, client: ApiClient) -> Self {
        client.set_organization(config.organization.clone());

        let ctx = Arc::new(ActionContext {
            client: Arc::new(client),
            dispatcher: Arc::new(Dispatcher::new()),
            alerts: AlertCenter::new(),
            loader: Loader::new(),
            session: Session::new(),
        });

        let registry = Registry::new(&ctx, config.page_count);
        let settings = DocumentSlot::new(&ctx);
        let subscription = DocumentSlot::new(&ctx);
        let pod_units = UnitSlot::new(&ctx);
        let service_units = UnitSlot::new(&ctx);

        Self {
            config,
            ctx,
            events: EventDispatcher::new(),
            registry,
            settings,
            subscription,
            pod_units,
            service_units,
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
            event_stream: Mutex::new(None),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Fetch the CSRF token. Required before any mutation.
    pub async fn init(&self) -> Result<(), CoreError> {
        match self.ctx.client.fetch_csrf().await {
            Ok(_) => {
                self.ctx.session.activate();
                info!(url = %self.config.url, "console session ready");
                Ok(())
            }
            Err(e) => {
                if e.is_session_expired() {
                    self.ctx.session.expire();
                }
                Err(e.into())
            }
        }
    }

    /// Start keeping stores live: connect the `/event` stream (when
    /// enabled) and spawn one resync task per resource kind.
    ///
    /// Must be called from within a tokio runtime. Calling it twice is a
    /// no-op.
    pub fn listen(&self) -> Result<(), CoreError> {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if !tasks.is_empty() {
            return Ok(());
        }

        if self.config.events_enabled {
            let cookie = self
                .config
                .session_cookie
                .as_ref()
                .map(|c| c.expose_secret().to_owned());
            let handle = EventHandle::connect(
                self.ctx.client.event_url()?,
                ReconnectConfig::default(),
                self.cancel.child_token(),
                cookie,
            );

            let events = self.events.clone();
            let source = handle.subscribe();
            let cancel = self.cancel.clone();
            tasks.push(tokio::spawn(async move { events.forward(source, cancel).await }));

            *self
                .event_stream
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(handle);
        }

        tasks.extend(self.registry.listen(&self.events, &self.cancel));
        tasks.push(Arc::clone(&self.pod_units.actions).listen(&self.events, self.cancel.clone()));
        tasks.push(
            Arc::clone(&self.service_units.actions).listen(&self.events, self.cancel.clone()),
        );
        debug!(tasks = tasks.len(), "console listening for changes");
        Ok(())
    }

    /// Clear every store (logout, organization switch).
    pub fn reset(&self) {
        self.ctx.dispatcher.dispatch(Message::Reset);
    }

    /// Switch organization scope and drop data cached for the old one.
    pub fn set_organization(&self, organization: Option<String>) {
        self.ctx.client.set_organization(organization);
        self.reset();
    }

    /// Stop background tasks and wait for them to exit.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(handle) = self
            .event_stream
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.shutdown();
        }

        let tasks: Vec<_> = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for task in tasks {
            let _ = task.await;
        }
        debug!("console shut down");
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn store<R: Registered>(&self) -> &Arc<Store<R>> {
        &R::slot(&self.registry).store
    }

    pub fn actions<R: Registered>(&self) -> &Arc<Actions<R>> {
        &R::slot(&self.registry).actions
    }

    pub fn resources(&self) -> &Registry {
        &self.registry
    }

    pub fn settings(&self) -> &DocumentSlot<Settings> {
        &self.settings
    }

    pub fn subscription(&self) -> &DocumentSlot<Subscription> {
        &self.subscription
    }

    pub fn pod_units(&self) -> &UnitSlot<Pod> {
        &self.pod_units
    }

    pub fn service_units(&self) -> &UnitSlot<Service> {
        &self.service_units
    }

    pub fn client(&self) -> &ApiClient {
        &self.ctx.client
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.ctx.dispatcher
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    pub fn alerts(&self) -> &AlertCenter {
        &self.ctx.alerts
    }

    pub fn loader(&self) -> &Loader {
        &self.ctx.loader
    }

    pub fn session(&self) -> &Session {
        &self.ctx.session
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
