//! Version Manifest
//!
//! One document per build mapping each collection to its root hash. Clients
//! fetch it on every visit and compare against their cached hashes.

use crate::types::{CollectionId, ContentHash};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Published `version.json` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionManifest {
    #[serde(with = "rfc3339_millis")]
    pub generated_at: DateTime<Utc>,
    pub hashes: BTreeMap<CollectionId, ContentHash>,
}

impl VersionManifest {
    pub fn hash_of(&self, collection: &str) -> Option<&ContentHash> {
        self.hashes.get(collection)
    }

    pub fn collection_ids(&self) -> impl Iterator<Item = &CollectionId> {
        self.hashes.keys()
    }
}

/// Accumulates collection root hashes during a build
#[derive(Debug, Default)]
pub struct ManifestBuilder {
    hashes: BTreeMap<CollectionId, ContentHash>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the root hash of a fully aggregated collection
    ///
    /// Recording the same id twice keeps the latest hash.
    pub fn record(&mut self, collection: impl Into<CollectionId>, hash: ContentHash) -> &mut Self {
        self.hashes.insert(collection.into(), hash);
        self
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Seal the manifest with the build timestamp
    ///
    /// The timestamp is cut to the millisecond precision it is written with.
    pub fn finish(self, generated_at: DateTime<Utc>) -> VersionManifest {
        VersionManifest {
            generated_at: generated_at.trunc_subsecs(3),
            hashes: self.hashes,
        }
    }
}

/// Timestamps are written as `2024-05-01T12:00:00.000Z`.
mod rfc3339_millis {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
