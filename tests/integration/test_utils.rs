//! Shared test utilities for integration tests
//!
//! Provides a content fixture writer and a fetcher that serves a publish
//! root straight from disk, so the synchronizer can run against real build
//! output without a network.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use syllabus::config::BuildConfig;
use syllabus::error::SyncError;
use syllabus::sync::fetch::Fetcher;

/// Write `contents` to `root/rel`, creating parent directories
pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Build config rooted in a temp workspace
pub fn build_config(workspace: &Path) -> BuildConfig {
    BuildConfig {
        source_root: workspace.join("content"),
        publish_root: workspace.join("docs"),
        ..BuildConfig::default()
    }
}

/// Serves files below a publish root and records every request
pub struct DirFetcher {
    root: PathBuf,
    requests: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
}

impl DirFetcher {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            requests: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Make every request whose path contains `fragment` fail with HTTP 503
    pub fn fail_matching(&self, fragment: &str) {
        self.failing.lock().insert(fragment.to_string());
    }

    pub fn heal(&self) {
        self.failing.lock().clear();
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    pub fn take_requests(&self) -> Vec<String> {
        std::mem::take(&mut *self.requests.lock())
    }

    /// Number of recorded requests for paths containing `fragment`
    pub fn count_matching(&self, fragment: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|path| path.contains(fragment))
            .count()
    }
}

#[async_trait]
impl Fetcher for DirFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, SyncError> {
        self.requests.lock().push(path.to_string());
        let url = self.location(path);
        if self.failing.lock().iter().any(|f| path.contains(f.as_str())) {
            return Err(SyncError::Status { url, status: 503 });
        }
        fs::read(self.root.join(path)).map_err(|_| SyncError::Status { url, status: 404 })
    }

    fn location(&self, path: &str) -> String {
        format!("file://{}/{}", self.root.display(), path)
    }
}
