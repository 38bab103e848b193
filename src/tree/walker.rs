//! Directory listing for a single tree location
//!
//! The walker only enumerates; it never hashes. Entries are returned sorted
//! by name so that descriptor output is stable, although node hashes do not
//! depend on this order.

use crate::error::BuildError;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Source layout conventions
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Whether to follow symbolic links (default: false for determinism)
    pub follow_symlinks: bool,
    /// Name of the per-node index document
    pub index_file: String,
    /// Folder holding collection quiz definitions
    pub quiz_dir: String,
    /// Folder holding flashcard deck definitions
    pub flashcard_dir: String,
    /// Directory name prefixes that never become child nodes
    pub hidden_prefixes: Vec<String>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            index_file: "index.md".to_string(),
            quiz_dir: "_collection_quiz".to_string(),
            flashcard_dir: "_flashcards".to_string(),
            hidden_prefixes: vec!["_".to_string(), ".".to_string()],
        }
    }
}

/// A resource definition file found in a resource folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFile {
    /// File stem, used as the resource id
    pub id: String,
    pub path: PathBuf,
}

/// Everything a node directory contributes before hashing
#[derive(Debug, Clone)]
pub struct NodeListing {
    /// Raw bytes of the index document, if it could be read
    pub index: Option<Vec<u8>>,
    /// `None` when the quiz folder does not exist
    pub quizzes: Option<Vec<ResourceFile>>,
    /// `None` when the flashcard folder does not exist
    pub flashcards: Option<Vec<ResourceFile>>,
    /// Child directories as (name, path), sorted by name
    pub children: Vec<(String, PathBuf)>,
}

/// Lister for node directories
pub struct Walker {
    config: WalkerConfig,
}

impl Walker {
    pub fn new() -> Self {
        Self {
            config: WalkerConfig::default(),
        }
    }

    pub fn with_config(config: WalkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    /// List one node directory
    ///
    /// A missing or unreadable index and missing resource folders degrade to
    /// `None`. Failing to list the node directory itself, or an existing
    /// resource folder, is a `SourceRead` error.
    pub fn list(&self, dir: &Path) -> Result<NodeListing, BuildError> {
        let index = std::fs::read(dir.join(&self.config.index_file)).ok();
        let quizzes = self.list_resources(&dir.join(&self.config.quiz_dir))?;
        let flashcards = self.list_resources(&dir.join(&self.config.flashcard_dir))?;

        let mut children = Vec::new();
        for entry in self.read_dir(dir) {
            let entry = entry.map_err(|e| walk_error(dir, e))?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if self.is_hidden(&name) {
                continue;
            }
            children.push((name, entry.path().to_path_buf()));
        }

        Ok(NodeListing {
            index,
            quizzes,
            flashcards,
            children,
        })
    }

    /// List the `*.json` definitions of a resource folder
    fn list_resources(&self, dir: &Path) -> Result<Option<Vec<ResourceFile>>, BuildError> {
        match std::fs::metadata(dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(BuildError::source_read(dir, e)),
        }

        let mut files = Vec::new();
        for entry in self.read_dir(dir) {
            let entry = entry.map_err(|e| walk_error(dir, e))?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some("json")
            {
                continue;
            }
            let Some(stem) = path.file_stem() else {
                continue;
            };
            files.push(ResourceFile {
                id: stem.to_string_lossy().to_string(),
                path: path.to_path_buf(),
            });
        }
        Ok(Some(files))
    }

    fn read_dir(&self, dir: &Path) -> walkdir::IntoIter {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
    }

    fn is_hidden(&self, name: &str) -> bool {
        self.config
            .hidden_prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }
}

impl Default for Walker {
    fn default() -> Self {
        Self::new()
    }
}

fn walk_error(dir: &Path, err: walkdir::Error) -> BuildError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "filesystem loop detected"));
    BuildError::source_read(path, source)
}
