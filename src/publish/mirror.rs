//! Asset mirroring for published nodes
//!
//! Copies a node's recognized raw files next to its descriptor. Mirroring
//! is best-effort: a failed copy is logged and never aborts a build.

use std::path::Path;
use tracing::{debug, warn};

/// Copies the raw files of one source directory into the publish tree
pub trait AssetMirror {
    /// Copy recognized files directly under `source_dir` into `dest_dir`
    ///
    /// Returns the number of files copied. A missing `source_dir` copies nothing.
    fn mirror(&self, source_dir: &Path, dest_dir: &Path) -> usize;
}

/// Filesystem mirror that copies files by extension
#[derive(Debug, Clone)]
pub struct FsAssetMirror {
    extensions: Vec<String>,
}

impl FsAssetMirror {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }

    fn is_recognized(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|known| known == ext))
            .unwrap_or(false)
    }
}

impl Default for FsAssetMirror {
    fn default() -> Self {
        Self::new(vec!["json".to_string(), "md".to_string()])
    }
}

impl AssetMirror for FsAssetMirror {
    fn mirror(&self, source_dir: &Path, dest_dir: &Path) -> usize {
        let entries = match std::fs::read_dir(source_dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(source = %source_dir.display(), error = %e, "Nothing to mirror");
                return 0;
            }
        };
        if let Err(e) = std::fs::create_dir_all(dest_dir) {
            warn!(dest = %dest_dir.display(), error = %e, "Failed to create mirror directory");
            return 0;
        }

        let mut copied = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || !self.is_recognized(&path) {
                continue;
            }
            let dest = dest_dir.join(entry.file_name());
            match std::fs::copy(&path, &dest) {
                Ok(_) => copied += 1,
                Err(e) => warn!(
                    source = %path.display(),
                    dest = %dest.display(),
                    error = %e,
                    "Failed to mirror asset"
                ),
            }
        }
        copied
    }
}
