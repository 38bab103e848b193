//! Client Cache Synchronizer
//!
//! Keeps a local copy of collection descriptors current with two levels of
//! checks. The small manifest is fetched on every run. A collection's large
//! descriptor is fetched only when the manifest hash differs from the cached
//! one.
//!
//! ```text
//! INIT --> MANIFEST_FETCHED --+--> CACHE_HIT ---------------+
//!   |                         +--> CACHE_MISS_FETCHING --+--+--> RENDERED
//!   +--> (no manifest) fail                            +--> CACHE_MISS_FAILED
//! ```
//!
//! Collections resolve concurrently and independently. A failure in one
//! never blocks or fails another.

pub mod fetch;
pub mod scheme;
pub mod store;

use crate::error::SyncError;
use crate::manifest::VersionManifest;
use crate::tree::TreeNode;
use crate::types::{CollectionId, ContentHash};
use fetch::Fetcher;
use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::Mutex;
use scheme::PathScheme;
use std::sync::Arc;
use std::time::{Duration, Instant};
use store::{CacheContents, CacheStore, ClientCacheEntry};
use tracing::{debug, error, info, instrument, warn};

/// Where the manifest used by a run came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestSource {
    Network,
    /// Network fetch failed; the last persisted manifest was used
    Cache,
}

/// Resolved state of one collection
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionState {
    /// Hash unchanged; the cached descriptor was used without a network call
    Hit(TreeNode),
    /// Hash changed or nothing cached; the descriptor was re-fetched and cached
    Fetched(TreeNode),
    /// Re-fetch failed; carries a user-visible message
    Failed(String),
}

impl CollectionState {
    pub fn document(&self) -> Option<&TreeNode> {
        match self {
            CollectionState::Hit(doc) | CollectionState::Fetched(doc) => Some(doc),
            CollectionState::Failed(_) => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CollectionState::Hit(_) => "cache-hit",
            CollectionState::Fetched(_) => "fetched",
            CollectionState::Failed(_) => "failed",
        }
    }
}

/// Outcome for one collection, handed to presentation
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionResult {
    pub id: CollectionId,
    /// Hash announced by the manifest
    pub hash: ContentHash,
    pub state: CollectionState,
}

/// Outcome of a full synchronizer run
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub manifest: VersionManifest,
    pub manifest_source: ManifestSource,
    /// Results sorted by collection id
    pub collections: Vec<CollectionResult>,
    pub duration: Duration,
}

impl SyncReport {
    pub fn count(&self, state: &str) -> usize {
        self.collections
            .iter()
            .filter(|result| result.state.name() == state)
            .count()
    }
}

/// Synchronizer settings
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub scheme: PathScheme,
    /// Path of the manifest relative to the site base
    pub manifest_path: String,
    /// Upper bound for each individual fetch
    pub timeout: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            scheme: PathScheme::nested("content-public/universities", "meta.json"),
            manifest_path: "version.json".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// One synchronizer serves one page visit's worth of resolution
pub struct Synchronizer {
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn CacheStore>,
    options: SyncOptions,
}

impl Synchronizer {
    pub fn new(fetcher: Arc<dyn Fetcher>, store: Arc<dyn CacheStore>, options: SyncOptions) -> Self {
        Self {
            fetcher,
            store,
            options,
        }
    }

    /// Run the protocol and collect every collection's result
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        self.run_with(|_| {}).await
    }

    /// Run the protocol, handing each collection to `on_resolved` as soon as
    /// it resolves
    ///
    /// Collections arrive in completion order, not id order. Fails only when
    /// no manifest is available at all.
    #[instrument(skip(self, on_resolved))]
    pub async fn run_with<R>(&self, mut on_resolved: R) -> Result<SyncReport, SyncError>
    where
        R: FnMut(&CollectionResult),
    {
        let start = Instant::now();
        let (manifest, manifest_source) = self.load_manifest().await?;

        let cache = Mutex::new(store::load_contents(self.store.as_ref()));
        let mut pending: FuturesUnordered<_> = manifest
            .hashes
            .iter()
            .map(|(id, hash)| self.resolve_collection(id, hash, &cache))
            .collect();

        let mut collections = Vec::with_capacity(manifest.hashes.len());
        while let Some(result) = pending.next().await {
            on_resolved(&result);
            collections.push(result);
        }
        drop(pending);
        collections.sort_by(|a, b| a.id.cmp(&b.id));

        let report = SyncReport {
            manifest,
            manifest_source,
            collections,
            duration: start.elapsed(),
        };
        info!(
            collections = report.collections.len(),
            hits = report.count("cache-hit"),
            fetched = report.count("fetched"),
            failed = report.count("failed"),
            duration_ms = report.duration.as_millis() as u64,
            "Sync completed"
        );
        Ok(report)
    }

    /// Fetch the manifest, falling back to the last persisted one
    pub async fn load_manifest(&self) -> Result<(VersionManifest, ManifestSource), SyncError> {
        match self.fetch_json::<VersionManifest>(&self.options.manifest_path).await {
            Ok(manifest) => {
                debug!(collections = manifest.hashes.len(), "Manifest fetched");
                if let Err(e) = store::save_manifest(self.store.as_ref(), &manifest) {
                    warn!(error = %e, "Failed to persist manifest");
                }
                Ok((manifest, ManifestSource::Network))
            }
            Err(fetch_err) => match store::load_manifest(self.store.as_ref()) {
                Some(manifest) => {
                    warn!(error = %fetch_err, "Manifest fetch failed, using cached manifest");
                    Ok((manifest, ManifestSource::Cache))
                }
                None => {
                    error!(error = %fetch_err, "Manifest fetch failed and no cached manifest exists");
                    Err(SyncError::ManifestUnavailable)
                }
            },
        }
    }

    /// Fetch the descriptor of a node below a collection
    ///
    /// Only the nested scheme can address nodes below collection level. The
    /// result is not cached: the collection descriptor already embeds it.
    pub async fn fetch_node<S: AsRef<str>>(
        &self,
        collection: &str,
        path: &[S],
    ) -> Result<TreeNode, SyncError> {
        let node_path = self
            .options
            .scheme
            .node_path(collection, path)
            .ok_or_else(|| {
                let segments: Vec<&str> = path.iter().map(|s| AsRef::<str>::as_ref(s)).collect();
                SyncError::Unaddressable(format!("{}/{}", collection, segments.join("/")))
            })?;
        self.fetch_json(&node_path).await
    }

    async fn resolve_collection(
        &self,
        id: &CollectionId,
        hash: &ContentHash,
        cache: &Mutex<CacheContents>,
    ) -> CollectionResult {
        let cached = cache
            .lock()
            .get(id)
            .filter(|entry| &entry.hash == hash)
            .and_then(|entry| entry.document.clone());

        let state = match cached {
            Some(document) => {
                debug!(collection = %id, "Cache hit");
                CollectionState::Hit(document)
            }
            None => {
                debug!(collection = %id, hash = %hash.short(12), "Cache miss, fetching descriptor");
                let path = self.options.scheme.collection_path(id);
                match self.fetch_json::<TreeNode>(&path).await {
                    Ok(document) => {
                        self.cache_document(id, hash, &document, cache);
                        CollectionState::Fetched(document)
                    }
                    Err(e) => {
                        warn!(collection = %id, error = %e, "Descriptor fetch failed");
                        CollectionState::Failed(format!("Failed to load {}: {}", id, e))
                    }
                }
            }
        };

        CollectionResult {
            id: id.clone(),
            hash: hash.clone(),
            state,
        }
    }

    /// Replace one collection's entry and persist the cache
    ///
    /// The entry records the manifest hash the descriptor was fetched for, so
    /// the next run with the same manifest is a hit. A descriptor carrying a
    /// different hash is still cached, with a warning.
    fn cache_document(
        &self,
        id: &CollectionId,
        manifest_hash: &ContentHash,
        document: &TreeNode,
        cache: &Mutex<CacheContents>,
    ) {
        if &document.hash != manifest_hash {
            warn!(
                collection = %id,
                manifest = %manifest_hash.short(12),
                descriptor = %document.hash.short(12),
                "Descriptor hash does not match manifest"
            );
        }

        let mut contents = cache.lock();
        contents.insert(
            id.clone(),
            ClientCacheEntry {
                hash: manifest_hash.clone(),
                document: Some(document.clone()),
            },
        );
        if let Err(e) = store::save_contents(self.store.as_ref(), &contents) {
            warn!(collection = %id, error = %e, "Failed to persist cache entry");
        }
    }

    /// Fetch and decode one document, bounded by the configured timeout
    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, SyncError> {
        let url = self.fetcher.location(path);
        let body = tokio::time::timeout(self.options.timeout, self.fetcher.fetch(path))
            .await
            .map_err(|_| SyncError::Timeout {
                url: url.clone(),
                timeout_ms: self.options.timeout.as_millis() as u64,
            })??;

        serde_json::from_slice(&body).map_err(|e| SyncError::Decode {
            url,
            message: e.to_string(),
        })
    }
}
