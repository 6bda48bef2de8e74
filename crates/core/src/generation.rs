//! Generation lifecycle: install-time population and activation-time pruning.
//!
//! A [`GenerationManager`] is bound to the two generation names of one
//! deployed version. Install fills the asset generation from the precache
//! manifest; activation deletes every other generation.

use std::sync::Arc;

use url::Url;

use crate::Error;
use crate::cache::{CacheDb, GenerationHandle, GenerationNames};
use crate::network::Network;
use crate::notify::{Broadcast, ClientMessage};
use crate::request::{Request, RequestIdentity, RequestMode};
use crate::response::Response;

/// Owns the active generation handles for one version.
#[derive(Clone)]
pub struct GenerationManager {
    db: CacheDb,
    names: GenerationNames,
    assets: GenerationHandle,
    api: GenerationHandle,
    broadcast: Option<Arc<dyn Broadcast>>,
}

impl std::fmt::Debug for GenerationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationManager")
            .field("names", &self.names)
            .field("broadcast", &self.broadcast.is_some())
            .finish_non_exhaustive()
    }
}

impl GenerationManager {
    /// Open (creating if needed) both generations named by `names`.
    pub async fn open(db: CacheDb, names: GenerationNames) -> Result<Self, Error> {
        let assets = db.open_generation(&names.asset).await?;
        let api = db.open_generation(&names.api).await?;
        Ok(Self { db, names, assets, api, broadcast: None })
    }

    /// Publish lifecycle messages to connected clients.
    pub fn with_broadcast(mut self, broadcast: Arc<dyn Broadcast>) -> Self {
        self.broadcast = Some(broadcast);
        self
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub fn names(&self) -> &GenerationNames {
        &self.names
    }

    /// Handle to the asset generation.
    pub fn assets(&self) -> &GenerationHandle {
        &self.assets
    }

    /// Handle to the api generation.
    pub fn api(&self) -> &GenerationHandle {
        &self.api
    }

    /// Fetch every manifest URL and store the results in the asset generation.
    ///
    /// All-or-nothing: a network failure or non-2xx status on any entry
    /// aborts the step before anything is written. The returned count is
    /// the number of entries stored.
    ///
    /// # Errors
    ///
    /// Returns `Error::InstallFailed` naming the first manifest URL that
    /// could not be fetched, or a database error from the final write.
    pub async fn install_populate<N>(&self, network: &N, manifest: &[Url]) -> Result<usize, Error>
    where
        N: Network + ?Sized,
    {
        let mut fetched: Vec<(RequestIdentity, Response)> = Vec::with_capacity(manifest.len());

        for url in manifest {
            let request = Request::from_url(url.clone(), RequestMode::NoCors);
            let response = network.fetch(&request).await.map_err(|e| {
                tracing::warn!(url = %url, error = %e, "precache fetch failed");
                Error::InstallFailed { url: url.to_string(), reason: e.to_string() }
            })?;

            if !response.is_ok() {
                tracing::warn!(url = %url, status = response.status, "precache fetch returned non-ok status");
                return Err(Error::InstallFailed { url: url.to_string(), reason: format!("status {}", response.status) });
            }

            fetched.push((RequestIdentity::get(url), response));
        }

        let stored = self.db.put_entries(&self.assets, &fetched).await?;
        tracing::info!(generation = %self.names.asset, stored, "installed precache manifest");
        Ok(stored)
    }

    /// Delete every generation other than this version's two.
    ///
    /// The current set is the [`GenerationNames`] this manager was opened
    /// with; the engine reads and writes through handles to exactly those
    /// names, so a different keep set would prune live generations. Use
    /// [`CacheDb::prune_generations`] directly for an arbitrary set.
    ///
    /// Must not run while fulfillment tasks may still write to a generation
    /// being deleted; hosts call it before accepting requests.
    pub async fn activate_prune(&self) -> Result<Vec<String>, Error> {
        // Re-open first so a generation deleted out from under us is recreated.
        self.db.open_generation(&self.names.asset).await?;
        self.db.open_generation(&self.names.api).await?;

        let deleted = self
            .db
            .prune_generations(&[self.names.asset.as_str(), self.names.api.as_str()])
            .await?;

        tracing::info!(
            asset = %self.names.asset,
            api = %self.names.api,
            deleted = deleted.len(),
            "activated generations"
        );

        self.publish(ClientMessage::Activated {
            asset: self.names.asset.clone(),
            api: self.names.api.clone(),
            deleted: deleted.clone(),
        });

        Ok(deleted)
    }

    /// Tell connected clients a background sync run finished.
    pub fn announce_sync(&self, tag: &str) {
        self.publish(ClientMessage::SyncCompleted { tag: tag.to_string(), timestamp: chrono::Utc::now().to_rfc3339() });
    }

    fn publish(&self, message: ClientMessage) {
        if let Some(broadcast) = &self.broadcast {
            broadcast.broadcast(message);
        }
    }
}
