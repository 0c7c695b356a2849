// ── Per-resource actions ──

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{ActionContext, SyncToken};
use crate::dispatch::{Action, EventDispatcher};
use crate::error::CoreError;
use crate::model::{Filter, Node, NodeInit, Pod, Resource, Scope};
use crate::store::Store;

#[derive(Serialize)]
struct MultiUpdate<'a> {
    ids: &'a [String],
    action: &'a str,
}

/// REST operations for one resource collection.
///
/// Holds the collection's "latest sync" tokens: one for the paged listing,
/// one for scoped listings. Every caller sharing this instance shares the
/// tokens, so the last sync issued is the one that lands.
pub struct Actions<R: Resource> {
    ctx: Arc<ActionContext>,
    store: Arc<Store<R>>,
    latest_sync: SyncToken,
    latest_scoped: SyncToken,
}

impl<R: Resource> Actions<R> {
    pub fn new(ctx: Arc<ActionContext>, store: Arc<Store<R>>) -> Self {
        Self {
            ctx,
            store,
            latest_sync: SyncToken::default(),
            latest_scoped: SyncToken::default(),
        }
    }

    pub fn store(&self) -> &Arc<Store<R>> {
        &self.store
    }

    fn item_path(id: &str) -> String {
        format!("{}/{id}", R::KIND.path())
    }

    // ── Listing ──────────────────────────────────────────────────────

    /// Fetch the current page (with the store's filter) and dispatch it.
    pub async fn sync(&self) -> Result<(), CoreError> {
        self.sync_inner(true).await
    }

    /// [`sync`](Self::sync) without touching the loader.
    pub async fn sync_quiet(&self) -> Result<(), CoreError> {
        self.sync_inner(false).await
    }

    async fn sync_inner(&self, show_loading: bool) -> Result<(), CoreError> {
        let token = self.latest_sync.begin();
        let kind = R::KIND;
        let query = self.store.list_query();

        let result = {
            let _loading = show_loading.then(|| self.ctx.loader.loading());
            self.ctx
                .client
                .list::<R>(kind.path(), kind.list_key(), &query)
                .await
        };

        let context = format!("Failed to load {}", kind.plural());
        if let Some(page) = self
            .ctx
            .settle_sync(result, &self.latest_sync, token, &context)?
        {
            debug!(%kind, items = page.items.len(), count = page.count, "synced");
            self.ctx
                .dispatcher
                .dispatch(R::into_message(Action::sync(page.items, page.count)));
        }
        Ok(())
    }

    /// Fetch a scoped listing (e.g. names for a picker, nodes of a zone).
    ///
    /// An empty scope value clears that listing without a request. The
    /// request carries `names=true` unless the scope key already selects a
    /// names listing (`names`, `node_names`, ...).
    pub async fn sync_scoped(&self, scope: Scope) -> Result<(), CoreError> {
        let token = self.latest_scoped.begin();
        let kind = R::KIND;

        if scope.value.is_empty() {
            self.ctx
                .dispatcher
                .dispatch(R::into_message(Action::sync_scoped(scope, Vec::new())));
            return Ok(());
        }

        let mut query = Vec::with_capacity(2);
        if scope.key != "names" && !scope.key.ends_with("_names") {
            query.push(("names".to_owned(), "true".to_owned()));
        }
        query.extend(scope.to_query());

        let result = {
            let _loading = self.ctx.loader.loading();
            self.ctx
                .client
                .list::<R>(kind.path(), kind.list_key(), &query)
                .await
        };

        let context = format!("Failed to load {} names", kind.singular());
        if let Some(page) = self
            .ctx
            .settle_sync(result, &self.latest_scoped, token, &context)?
        {
            self.ctx
                .dispatcher
                .dispatch(R::into_message(Action::sync_scoped(scope, page.items)));
        }
        Ok(())
    }

    /// Move to `page` and refetch.
    pub async fn traverse(&self, page: u64) -> Result<(), CoreError> {
        self.ctx
            .dispatcher
            .dispatch(R::into_message(Action::Traverse { page }));
        self.sync().await
    }

    /// Replace the filter and refetch.
    pub async fn filter(&self, filter: Option<Filter>) -> Result<(), CoreError> {
        self.ctx
            .dispatcher
            .dispatch(R::into_message(Action::Filter { filter }));
        self.sync().await
    }

    /// Fetch a single record. `Ok(None)` if the session expired.
    pub async fn get(&self, id: &str) -> Result<Option<R>, CoreError> {
        let kind = R::KIND;
        let result = {
            let _loading = self.ctx.loader.loading();
            self.ctx.client.get::<R>(&Self::item_path(id), &[]).await
        };

        let context = format!("Failed to load {}", kind.singular());
        match result {
            Err(e) if e.is_not_found() => {
                self.ctx.alerts.error_response(&context, &e);
                Err(CoreError::NotFound {
                    kind,
                    identifier: id.to_owned(),
                })
            }
            result => self.ctx.settle(result, &context),
        }
    }

    // ── Mutations ────────────────────────────────────────────────────
    //
    // None of these dispatch: the server's change event (or the caller)
    // triggers the refetch.

    /// Save an edited record (`PUT /{kind}/{id}`).
    pub async fn commit(&self, resource: &R) -> Result<(), CoreError> {
        let path = Self::item_path(resource.id());
        self.mutate(
            &format!("Failed to save {}", R::KIND.singular()),
            self.ctx.client.put(&path, resource),
        )
        .await
    }

    /// Create a record (`POST /{kind}`).
    pub async fn create(&self, resource: &R) -> Result<(), CoreError> {
        self.mutate(
            &format!("Failed to create {}", R::KIND.singular()),
            self.ctx.client.post(R::KIND.path(), resource),
        )
        .await
    }

    /// Delete one record (`DELETE /{kind}/{id}`).
    pub async fn remove(&self, id: &str) -> Result<(), CoreError> {
        let path = Self::item_path(id);
        self.mutate(
            &format!("Failed to delete {}", R::KIND.singular()),
            self.ctx.client.delete(&path),
        )
        .await
    }

    /// Bulk delete (`DELETE /{kind}` with an id array body).
    pub async fn remove_multi(&self, ids: &[String]) -> Result<(), CoreError> {
        self.mutate(
            &format!("Failed to delete {}", R::KIND.plural()),
            self.ctx.client.delete_with_body(R::KIND.path(), &[], ids),
        )
        .await
    }

    /// Bulk delete bypassing delete protection (`?force=true`).
    pub async fn force_remove_multi(&self, ids: &[String]) -> Result<(), CoreError> {
        let query = [("force".to_owned(), "true".to_owned())];
        self.mutate(
            &format!("Failed to force delete {}", R::KIND.plural()),
            self.ctx.client.delete_with_body(R::KIND.path(), &query, ids),
        )
        .await
    }

    /// Apply one state action (`start`, `stop`, `restart`, ...) to many
    /// records (`PUT /{kind}` with `{ids, action}`).
    pub async fn update_multi(&self, ids: &[String], action: &str) -> Result<(), CoreError> {
        let body = MultiUpdate { ids, action };
        self.mutate(
            &format!("Failed to update {}", R::KIND.plural()),
            self.ctx.client.put(R::KIND.path(), &body),
        )
        .await
    }

    /// Run a named operation on one record (`PUT /{kind}/{id}/{op}`, no body).
    pub async fn operation(&self, id: &str, op: &str) -> Result<(), CoreError> {
        let path = format!("{}/{op}", Self::item_path(id));
        self.mutate(
            &format!("Failed to update {}", R::KIND.singular()),
            self.ctx.client.put_empty(&path),
        )
        .await
    }

    async fn mutate(
        &self,
        context: &str,
        request: impl Future<Output = Result<(), nimbus_api::Error>>,
    ) -> Result<(), CoreError> {
        let result = {
            let _loading = self.ctx.loader.loading();
            request.await
        };
        self.ctx.settle(result, context).map(|_| ())
    }

    // ── Server-pushed changes ────────────────────────────────────────

    /// Re-sync whenever the server reports this collection changed.
    ///
    /// Failures are already surfaced as alerts; the task keeps running
    /// until `cancel` fires or the event bus closes.
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
                    Ok(change) => change.kind == R::KIND,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(kind = %R::KIND, skipped, "change events lagged, resyncing");
                        true
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };

                if resync {
                    debug!(kind = %R::KIND, "server change, resyncing");
                    if let Err(e) = self.sync().await {
                        debug!(kind = %R::KIND, error = %e, "resync failed");
                    }
                }
            }
        })
    }
}

impl Actions<Pod> {
    /// Save a pod and deploy its drafted units (`PUT /pod/{id}/deploy`).
    pub async fn commit_deploy(&self, pod: &Pod, resync: bool) -> Result<(), CoreError> {
        let path = format!("{}/deploy", Self::item_path(&pod.id));
        self.mutate("Failed to save pod", self.ctx.client.put(&path, pod))
            .await?;
        self.resync_after_save(resync).await;
        Ok(())
    }

    /// Save unit drafts without deploying (`PUT /pod/{id}/drafts`). Runs
    /// without the loader since editors autosave through it.
    pub async fn commit_drafts(&self, pod: &Pod, resync: bool) -> Result<(), CoreError> {
        let path = format!("{}/drafts", Self::item_path(&pod.id));
        let result = self.ctx.client.put(&path, pod).await;
        self.ctx.settle(result, "Failed to save pod")?;
        self.resync_after_save(resync).await;
        Ok(())
    }

    async fn resync_after_save(&self, resync: bool) {
        if !resync {
            return;
        }
        if let Err(e) = self.sync_quiet().await {
            debug!(error = %e, "pod resync after save failed");
        }
    }
}

impl Actions<Node> {
    /// Provision a freshly installed node (`POST /node/{id}/init`).
    pub async fn init(&self, id: &str, setup: &NodeInit) -> Result<(), CoreError> {
        let path = format!("{}/init", Self::item_path(id));
        self.mutate("Failed to update node", self.ctx.client.post(&path, setup))
            .await
    }
}
