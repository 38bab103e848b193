//! Content publishing
//!
//! Full, non-incremental build over the source tree:
//!
//! ```text
//! <source>/<collections>/<id>/...  --scan-->  TreeNode per collection
//!                                  --write--> <publish>/<content>/<collections>/<id>/.../meta.json
//!                                  --mirror-> raw .json/.md next to each meta.json
//!                                  --seal-->  <publish>/version.json
//! ```
//!
//! Every collection is scanned before anything is written. A source read
//! failure therefore leaves the previous publish untouched.

pub mod mirror;

use crate::config::BuildConfig;
use crate::error::BuildError;
use crate::manifest::{ManifestBuilder, VersionManifest};
use crate::tree::walker::WalkerConfig;
use crate::tree::{TreeBuilder, TreeNode};
use crate::types::CollectionId;
use chrono::Utc;
use mirror::{AssetMirror, FsAssetMirror};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

/// Summary of a completed build
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub manifest: VersionManifest,
    pub manifest_path: PathBuf,
    pub node_count: usize,
    pub mirrored_files: usize,
    pub duration: Duration,
}

/// Publisher for one source root / publish root pair
pub struct Publisher {
    config: BuildConfig,
    builder: TreeBuilder,
    mirror: Box<dyn AssetMirror>,
    walker_config: WalkerConfig,
}

impl Publisher {
    /// Create a publisher; relative roots in `config` are taken as-is
    pub fn new(config: BuildConfig) -> Self {
        let mirror = FsAssetMirror::new(config.mirror_extensions.clone());
        Self::with_mirror(config, Box::new(mirror))
    }

    /// Create a publisher with a custom asset mirror
    pub fn with_mirror(config: BuildConfig, mirror: Box<dyn AssetMirror>) -> Self {
        let walker_config = WalkerConfig::default();
        Self {
            config,
            builder: TreeBuilder::new().with_walker_config(walker_config.clone()),
            mirror,
            walker_config,
        }
    }

    /// Directory whose sub-directories are the collections
    pub fn collections_root(&self) -> PathBuf {
        self.config.source_root.join(&self.config.collections_dir)
    }

    /// Directory receiving descriptors and mirrored assets
    pub fn content_root(&self) -> PathBuf {
        self.config.publish_root.join(&self.config.content_dir)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.config.publish_root.join(&self.config.manifest_file)
    }

    /// Run a full build
    #[instrument(skip(self), fields(source = %self.config.source_root.display()))]
    pub fn run(&self) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        info!("Starting build");

        let collections = self.scan_collections()?;

        let mut manifest = ManifestBuilder::new();
        for (id, node) in &collections {
            manifest.record(id.clone(), node.hash.clone());
        }

        let content_root = self.content_root();
        remove_dir_if_exists(&content_root)?;
        debug!(path = %content_root.display(), "Cleaned publish content directory");

        let publish_base = content_root.join(&self.config.collections_dir);
        let source_base = self.collections_root();
        let mut mirrored_files = 0;
        for (id, node) in &collections {
            mirrored_files += self.write_node(node, &source_base.join(id), &publish_base.join(id))?;
        }

        let manifest = manifest.finish(Utc::now());
        let manifest_path = self.manifest_path();
        write_json(&manifest_path, &manifest)?;

        let report = BuildReport {
            node_count: collections.iter().map(|(_, node)| node.node_count()).sum(),
            manifest,
            manifest_path,
            mirrored_files,
            duration: start.elapsed(),
        };
        info!(
            collections = collections.len(),
            node_count = report.node_count,
            mirrored_files = report.mirrored_files,
            manifest = %report.manifest_path.display(),
            duration_ms = report.duration.as_millis() as u64,
            "Build completed"
        );
        Ok(report)
    }

    /// Aggregate every collection, in collection id order
    pub fn scan_collections(&self) -> Result<Vec<(CollectionId, TreeNode)>, BuildError> {
        let root = self.collections_root();
        let mut collections = Vec::new();

        for entry in WalkDir::new(&root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                let source = e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop detected")
                });
                BuildError::source_read(path, source)
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }

            let id = entry.file_name().to_string_lossy().to_string();
            info!(collection = %id, "Processing collection");
            let node = self.builder.build(entry.path())?;
            collections.push((id, node));
        }

        Ok(collections)
    }

    /// Write the descriptor of `node` and its subtree, mirroring raw assets
    fn write_node(&self, node: &TreeNode, source: &Path, dest: &Path) -> Result<usize, BuildError> {
        std::fs::create_dir_all(dest).map_err(|e| BuildError::publish(dest, e))?;

        let mut mirrored = self.mirror.mirror(source, dest);
        for resource_dir in [&self.walker_config.quiz_dir, &self.walker_config.flashcard_dir] {
            mirrored += self
                .mirror
                .mirror(&source.join(resource_dir), &dest.join(resource_dir));
        }
        // The descriptor wins over a same-named source file.
        write_json(&dest.join(&self.config.descriptor_file), node)?;

        for (name, child) in &node.children {
            mirrored += self.write_node(child, &source.join(name), &dest.join(name))?;
        }
        Ok(mirrored)
    }
}

fn remove_dir_if_exists(path: &Path) -> Result<(), BuildError> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BuildError::publish(path, e)),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), BuildError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| BuildError::Encode {
        path: path.to_path_buf(),
        source: e,
    })?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| BuildError::publish(parent, e))?;
    }
    std::fs::write(path, json).map_err(|e| BuildError::publish(path, e))
}
