// ── Singleton document actions ──

use std::sync::Arc;

use tracing::debug;

use super::{ActionContext, SyncToken};
use crate::dispatch::DocumentAction;
use crate::error::CoreError;
use crate::model::{Document, Subscription};
use crate::store::DocumentStore;

/// Fetch and save one singleton document (settings, subscription).
pub struct DocumentActions<D: Document> {
    ctx: Arc<ActionContext>,
    store: Arc<DocumentStore<D>>,
    latest_sync: SyncToken,
}

impl<D: Document> DocumentActions<D> {
    pub fn new(ctx: Arc<ActionContext>, store: Arc<DocumentStore<D>>) -> Self {
        Self {
            ctx,
            store,
            latest_sync: SyncToken::default(),
        }
    }

    pub fn store(&self) -> &Arc<DocumentStore<D>> {
        &self.store
    }

    fn publish(&self, doc: D) {
        self.ctx
            .dispatcher
            .dispatch(D::into_message(DocumentAction::Sync(Arc::new(doc))));
    }

    /// `GET /{path}` and dispatch the document.
    pub async fn sync(&self) -> Result<(), CoreError> {
        self.fetch(D::PATH, &format!("Failed to load {}", D::NOUN))
            .await
            .map(|_| ())
    }

    /// Returns whether a document was dispatched.
    async fn fetch(&self, path: &str, context: &str) -> Result<bool, CoreError> {
        let token = self.latest_sync.begin();
        let result = {
            let _loading = self.ctx.loader.loading();
            self.ctx.client.get::<D>(path, &[]).await
        };

        match self
            .ctx
            .settle_sync(result, &self.latest_sync, token, context)?
        {
            Some(doc) => {
                debug!(path, "document synced");
                self.publish(doc);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// `PUT /{path}` and dispatch the saved copy.
    pub async fn commit(&self, doc: &D) -> Result<(), CoreError> {
        let result = {
            let _loading = self.ctx.loader.loading();
            self.ctx.client.put(D::PATH, doc).await
        };

        if self
            .ctx
            .settle(result, &format!("Failed to save {}", D::NOUN))?
            .is_some()
        {
            self.publish(doc.clone());
        }
        Ok(())
    }
}

#[derive(serde::Serialize)]
struct Activation<'a> {
    license: &'a str,
}

impl DocumentActions<Subscription> {
    /// Ask the console to re-check the license upstream, then dispatch the
    /// result. A failed check clears the stored subscription.
    pub async fn sync_update(&self) -> Result<(), CoreError> {
        let path = format!("{}/update", Subscription::PATH);
        match self.fetch(&path, "Failed to sync subscription").await {
            Err(err) => {
                self.publish(Subscription::default());
                Err(err)
            }
            Ok(_) => Ok(()),
        }
    }

    /// Activate a license key (`POST /subscription`).
    pub async fn activate(&self, license: &str) -> Result<(), CoreError> {
        let result = {
            let _loading = self.ctx.loader.loading();
            self.ctx
                .client
                .post_for::<_, Subscription>(Subscription::PATH, &Activation { license })
                .await
        };

        if let Some(doc) = self
            .ctx
            .settle(result, "Failed to activate subscription")?
        {
            self.publish(doc);
        }
        Ok(())
    }
}
