// ── Unit and deployment actions ──
//
// Pods and services group units; each unit has a spec history and a set of
// deployments. One unit at a time is inspected: `sync_unit` remembers
// which, and the host kind's change event re-fetches it.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{ActionContext, SyncToken};
use crate::dispatch::{DocumentAction, EventDispatcher, Message};
use crate::error::CoreError;
use crate::model::{Deployment, Pod, Resource, Service, Spec, SpecPage, UnitDetail};
use crate::store::DocumentStore;

/// Spec history is always fetched in pages of this size.
pub const SPEC_PAGE_COUNT: u64 = 100;

/// A resource that owns units (pods and services).
pub trait UnitHost: Resource {
    /// Noun used in alert messages, e.g. `"pod unit"`.
    const UNIT_NOUN: &'static str;

    /// Query key carrying the requested deployment state change.
    const STATE_PARAM: &'static str;

    /// Whether a unit that vanished (404) is ignored instead of alerted.
    const QUIET_MISSING_UNIT: bool;

    fn into_unit_message(action: DocumentAction<UnitDetail>) -> Message;

    fn unit_from_message(message: &Message) -> Option<&DocumentAction<UnitDetail>>;
}

impl UnitHost for Pod {
    const UNIT_NOUN: &'static str = "pod unit";
    const STATE_PARAM: &'static str = "action";
    const QUIET_MISSING_UNIT: bool = true;

    fn into_unit_message(action: DocumentAction<UnitDetail>) -> Message {
        Message::PodUnit(action)
    }

    fn unit_from_message(message: &Message) -> Option<&DocumentAction<UnitDetail>> {
        match message {
            Message::PodUnit(action) => Some(action),
            _ => None,
        }
    }
}

impl UnitHost for Service {
    const UNIT_NOUN: &'static str = "service unit";
    const STATE_PARAM: &'static str = "state";
    const QUIET_MISSING_UNIT: bool = false;

    fn into_unit_message(action: DocumentAction<UnitDetail>) -> Message {
        Message::ServiceUnit(action)
    }

    fn unit_from_message(message: &Message) -> Option<&DocumentAction<UnitDetail>> {
        match message {
            Message::ServiceUnit(action) => Some(action),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct DeployRequest<'a> {
    count: u32,
    spec: &'a str,
}

/// Unit inspection and deployment control for one host kind.
pub struct UnitActions<H: UnitHost> {
    ctx: Arc<ActionContext>,
    store: Arc<DocumentStore<UnitDetail>>,
    latest_sync: SyncToken,
    /// `(host id, unit id)` of the last unit synced.
    last: Mutex<Option<(String, String)>>,
    /// Cancelled by [`cancel_logs`](Self::cancel_logs), then replaced.
    logs: Mutex<CancellationToken>,
    _host: PhantomData<fn() -> H>,
}

impl<H: UnitHost> UnitActions<H> {
    pub fn new(ctx: Arc<ActionContext>, store: Arc<DocumentStore<UnitDetail>>) -> Self {
        Self {
            ctx,
            store,
            latest_sync: SyncToken::default(),
            last: Mutex::new(None),
            logs: Mutex::new(CancellationToken::new()),
            _host: PhantomData,
        }
    }

    pub fn store(&self) -> &Arc<DocumentStore<UnitDetail>> {
        &self.store
    }

    fn unit_path(host: &str, unit: &str) -> String {
        format!("{}/{host}/unit/{unit}", H::KIND.path())
    }

    fn deployment_path(deployment: &Deployment) -> Result<String, CoreError> {
        let host = deployment
            .host()
            .ok_or_else(|| CoreError::ValidationFailed {
                message: format!(
                    "deployment {} has no owning {}",
                    deployment.id,
                    H::KIND.singular()
                ),
            })?;
        Ok(format!(
            "{}/deployment/{}",
            Self::unit_path(host, &deployment.unit),
            deployment.id
        ))
    }

    // ── Unit view ────────────────────────────────────────────────────

    /// Fetch one unit (`GET /{kind}/{host}/unit/{unit}`) and remember it
    /// for later [`resync`](Self::resync) calls.
    pub async fn sync_unit(&self, host: &str, unit: &str) -> Result<(), CoreError> {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((host.to_owned(), unit.to_owned()));
        self.fetch_unit(host, unit).await
    }

    /// Re-fetch the last unit synced. Does nothing before the first one.
    pub async fn resync(&self) -> Result<(), CoreError> {
        let last = self
            .last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match last {
            Some((host, unit)) => self.fetch_unit(&host, &unit).await,
            None => Ok(()),
        }
    }

    async fn fetch_unit(&self, host: &str, unit: &str) -> Result<(), CoreError> {
        let token = self.latest_sync.begin();
        let result = self
            .ctx
            .client
            .get::<UnitDetail>(&Self::unit_path(host, unit), &[])
            .await;

        if H::QUIET_MISSING_UNIT && matches!(&result, Err(e) if e.is_not_found()) {
            debug!(host, unit, "unit gone, ignoring");
            return Ok(());
        }

        let context = format!("Failed to load {}", H::UNIT_NOUN);
        if let Some(detail) = self
            .ctx
            .settle_sync(result, &self.latest_sync, token, &context)?
        {
            self.ctx
                .dispatcher
                .dispatch(H::into_unit_message(DocumentAction::Sync(Arc::new(detail))));
        }
        Ok(())
    }

    // ── Deployments ──────────────────────────────────────────────────

    /// Launch `count` deployments of `spec`
    /// (`POST /{kind}/{host}/unit/{unit}/deployment`).
    pub async fn deploy(
        &self,
        host: &str,
        unit: &str,
        spec: &str,
        count: u32,
    ) -> Result<(), CoreError> {
        let path = format!("{}/deployment", Self::unit_path(host, unit));
        let result = {
            let _loading = self.ctx.loader.loading();
            self.ctx
                .client
                .post(&path, &DeployRequest { count, spec })
                .await
        };
        self.ctx
            .settle(result, "Failed to create deployments")
            .map(|_| ())
    }

    /// Apply a state change (`start`, `stop`, `archive`, `destroy`, ...) to
    /// several deployments of one unit. `commit` pins a spec for actions
    /// that redeploy.
    pub async fn update_deployments(
        &self,
        host: &str,
        unit: &str,
        ids: &[String],
        state: &str,
        commit: Option<&str>,
    ) -> Result<(), CoreError> {
        let path = format!("{}/deployment", Self::unit_path(host, unit));
        let mut query = vec![(H::STATE_PARAM.to_owned(), state.to_owned())];
        if let Some(commit) = commit {
            query.push(("commit".to_owned(), commit.to_owned()));
        }

        let result = {
            let _loading = self.ctx.loader.loading();
            self.ctx.client.put_with_query(&path, &query, ids).await
        };
        self.ctx
            .settle(result, "Failed to modify deployments")
            .map(|_| ())
    }

    /// Save an edited deployment (tags and the like).
    pub async fn commit_deployment(&self, deployment: &Deployment) -> Result<(), CoreError> {
        let path = Self::deployment_path(deployment)?;
        let result = {
            let _loading = self.ctx.loader.loading();
            self.ctx.client.put(&path, deployment).await
        };
        self.ctx
            .settle(result, "Failed to save deployment")
            .map(|_| ())
    }

    /// Fetch one log resource of a deployment. `Ok(None)` when the session
    /// expired or the request was cut short by [`cancel_logs`](Self::cancel_logs).
    pub async fn log(
        &self,
        deployment: &Deployment,
        resource: &str,
    ) -> Result<Option<serde_json::Value>, CoreError> {
        let path = format!("{}/log", Self::deployment_path(deployment)?);
        let query = [("resource".to_owned(), resource.to_owned())];
        let cancel = self
            .logs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let result = {
            let _loading = self.ctx.loader.loading();
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!(path, "log request cancelled");
                    return Ok(None);
                }
                result = self.ctx.client.get::<serde_json::Value>(&path, &query) => result,
            }
        };
        self.ctx.settle(result, "Failed to load check log")
    }

    /// Abort every log request in flight.
    pub fn cancel_logs(&self) {
        let previous = std::mem::replace(
            &mut *self.logs.lock().unwrap_or_else(PoisonError::into_inner),
            CancellationToken::new(),
        );
        previous.cancel();
    }

    // ── Server-pushed changes ────────────────────────────────────────

    /// Re-fetch the inspected unit whenever the host collection changes.
    pub fn listen(self: Arc<Self>, events: &EventDispatcher, cancel: CancellationToken) -> JoinHandle<()> {
        let mut rx = events.subscribe();
        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    event = rx.recv() => event,
                };

                let resync = match event {
                    Ok(change) => change.kind == H::KIND,
                    Err(broadcast::error::RecvError::Lagged(_)) => true,
                    Err(broadcast::error::RecvError::Closed) => break,
                };

                if !resync {
                    continue;
                }
                if let Err(e) = self.resync().await {
                    debug!(kind = %H::KIND, error = %e, "unit resync failed");
                }
            }
        })
    }
}

impl UnitActions<Pod> {
    /// One page of a pod unit's spec history.
    pub async fn specs(
        &self,
        pod: &str,
        unit: &str,
        page: u64,
    ) -> Result<Option<SpecPage>, CoreError> {
        let path = format!("{}/spec", Self::unit_path(pod, unit));
        let query = [
            ("page".to_owned(), page.to_string()),
            ("page_count".to_owned(), SPEC_PAGE_COUNT.to_string()),
        ];

        let result = {
            let _loading = self.ctx.loader.loading();
            self.ctx.client.get::<SpecPage>(&path, &query).await
        };
        Ok(self
            .ctx
            .settle(result, "Failed to load unit commits")?
            .map(|mut specs| {
                unit.clone_into(&mut specs.unit);
                specs.page = page;
                specs.page_count = SPEC_PAGE_COUNT;
                specs
            }))
    }

    /// A single spec revision, including its full data.
    pub async fn spec(&self, pod: &str, unit: &str, spec: &str) -> Result<Option<Spec>, CoreError> {
        let path = format!("{}/spec/{spec}", Self::unit_path(pod, unit));
        let result = self.ctx.client.get::<Spec>(&path, &[]).await;
        self.ctx.settle(result, "Failed to load unit commits")
    }
}
