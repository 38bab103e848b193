//! Client-local cache store
//!
//! The synchronizer persists two opaque JSON blobs through a `CacheStore`:
//! the last-seen manifest and the per-collection descriptor cache.

use crate::error::StoreError;
use crate::manifest::VersionManifest;
use crate::tree::TreeNode;
use crate::types::{CollectionId, ContentHash};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::warn;

/// Key of the last-seen manifest blob
pub const MANIFEST_KEY: &str = "contentVersion";
/// Key of the collection cache blob
pub const CONTENT_KEY: &str = "contentData";

/// Key-value storage for cache blobs
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// Cached descriptor of one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCacheEntry {
    pub hash: ContentHash,
    #[serde(default)]
    pub document: Option<TreeNode>,
}

/// All cached collections, keyed by collection id
pub type CacheContents = BTreeMap<CollectionId, ClientCacheEntry>;

/// Read the collection cache
///
/// A missing, unreadable or unparsable blob yields an empty cache. Entries
/// that fail to parse are dropped individually.
pub fn load_contents(store: &dyn CacheStore) -> CacheContents {
    let Some(blob) = read_blob(store, CONTENT_KEY) else {
        return CacheContents::new();
    };
    let raw: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&blob) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(key = CONTENT_KEY, error = %e, "Discarding corrupt cache blob");
            return CacheContents::new();
        }
    };

    raw.into_iter()
        .filter_map(|(id, value)| match serde_json::from_value(value) {
            Ok(entry) => Some((id, entry)),
            Err(e) => {
                warn!(collection = %id, error = %e, "Discarding corrupt cache entry");
                None
            }
        })
        .collect()
}

/// Write the collection cache
pub fn save_contents(store: &dyn CacheStore, contents: &CacheContents) -> Result<(), StoreError> {
    let blob = serde_json::to_string(contents)
        .map_err(|e| StoreError::Backend(format!("Failed to encode cache: {}", e)))?;
    store.set(CONTENT_KEY, &blob)
}

/// Read the last-seen manifest, if one is stored and parses
pub fn load_manifest(store: &dyn CacheStore) -> Option<VersionManifest> {
    let blob = read_blob(store, MANIFEST_KEY)?;
    match serde_json::from_str(&blob) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            warn!(key = MANIFEST_KEY, error = %e, "Discarding corrupt cached manifest");
            None
        }
    }
}

/// Remember a freshly fetched manifest
pub fn save_manifest(store: &dyn CacheStore, manifest: &VersionManifest) -> Result<(), StoreError> {
    let blob = serde_json::to_string(manifest)
        .map_err(|e| StoreError::Backend(format!("Failed to encode manifest: {}", e)))?;
    store.set(MANIFEST_KEY, &blob)
}

fn read_blob(store: &dyn CacheStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(blob) => blob,
        Err(e) => {
            warn!(key, error = %e, "Cache read failed, treating as empty");
            None
        }
    }
}

/// In-memory store for tests and one-shot runs
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.data.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.data.write().clear();
        Ok(())
    }
}

/// Sled-backed persistent store
pub struct SledCacheStore {
    db: sled::Db,
}

impl SledCacheStore {
    /// Open (or create) the store at the given directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }
}

impl CacheStore for SledCacheStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.db.get(key.as_bytes())? {
            Some(value) => String::from_utf8(value.to_vec())
                .map(Some)
                .map_err(|e| StoreError::Backend(format!("Value for {} is not UTF-8: {}", key, e))),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.db.clear()?;
        self.db.flush()?;
        Ok(())
    }
}
