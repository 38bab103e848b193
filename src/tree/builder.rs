//! Tree builder for aggregating content directories into descriptor trees

use crate::error::BuildError;
use crate::tree::front_matter;
use crate::tree::hasher;
use crate::tree::label::format_label;
use crate::tree::node::{ResourceRef, Resources, TreeNode};
use crate::tree::walker::{ResourceFile, Walker, WalkerConfig};
use crate::types::ContentHash;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, trace, warn};

/// Tree builder for one content subtree
///
/// Building is a pure function of the bytes under the root: nothing is
/// written, and each node is constructed exactly once after all of its
/// children.
pub struct TreeBuilder {
    walker: Walker,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            walker: Walker::new(),
        }
    }

    /// Set walker config (layout names, symlink policy).
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker = Walker::with_config(config);
        self
    }

    /// Build the descriptor tree rooted at `root`
    #[instrument(skip(self, root), fields(root = %root.display()))]
    pub fn build(&self, root: &Path) -> Result<TreeNode, BuildError> {
        self.build_with(root, &mut |_, _| {})
    }

    /// Build the descriptor tree, reporting every node as it is finalized
    ///
    /// `on_node` is called in post-order: a node is reported only after all
    /// of its descendants have been.
    pub fn build_with<F>(&self, root: &Path, on_node: &mut F) -> Result<TreeNode, BuildError>
    where
        F: FnMut(&Path, &TreeNode),
    {
        let start = Instant::now();
        let root =
            dunce::canonicalize(root).map_err(|e| BuildError::source_read(root.to_path_buf(), e))?;

        let node = self.build_node(&root, on_node)?;

        info!(
            node_count = node.node_count(),
            hash = %node.hash.short(12),
            duration_ms = start.elapsed().as_millis() as u64,
            "Tree build completed"
        );
        Ok(node)
    }

    /// Compute only the root hash of the subtree at `root`
    pub fn compute_root(&self, root: &Path) -> Result<ContentHash, BuildError> {
        Ok(self.build(root)?.hash)
    }

    fn build_node<F>(&self, dir: &Path, on_node: &mut F) -> Result<TreeNode, BuildError>
    where
        F: FnMut(&Path, &TreeNode),
    {
        trace!(path = %dir.display(), "Scanning node");
        let listing = self.walker.list(dir)?;
        let mut leaf_hashes = Vec::new();

        let dir_name = dir
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| BuildError::InvalidPath(format!("{:?} has no name", dir)))?;
        let mut label = format_label(&dir_name);
        let mut summary = None;
        let has_index = listing.index.is_some();

        if let Some(bytes) = &listing.index {
            leaf_hashes.push(hasher::compute_leaf_hash(bytes));
            match front_matter::parse(&String::from_utf8_lossy(bytes)) {
                Ok(fm) => {
                    if let Some(title) = fm.title {
                        label = title;
                    }
                    summary = Some(fm.summary.unwrap_or_default());
                }
                Err(e) => {
                    warn!(path = %dir.display(), error = %e, "Ignoring malformed front matter");
                    summary = Some(String::new());
                }
            }
        }

        let collection_quizzes = listing
            .quizzes
            .as_deref()
            .map(|files| self.read_resources(files, &mut leaf_hashes))
            .transpose()?;
        let flashcard_decks = listing
            .flashcards
            .as_deref()
            .map(|files| self.read_resources(files, &mut leaf_hashes))
            .transpose()?;
        let resources = Resources {
            collection_quizzes,
            flashcard_decks,
        };

        let mut children = BTreeMap::new();
        for (name, path) in &listing.children {
            let child = self.build_node(path, on_node)?;
            children.insert(name.clone(), child);
        }

        let hash = hasher::aggregate_hashes(
            leaf_hashes
                .into_iter()
                .chain(children.values().map(|child| child.hash.clone())),
        );
        let is_branch = !children.is_empty() || (!resources.is_empty() && !has_index);

        let node = TreeNode {
            label,
            summary,
            has_index,
            is_branch,
            resources: (!resources.is_empty()).then_some(resources),
            children,
            hash,
        };
        debug!(path = %dir.display(), hash = %node.hash.short(12), "Node aggregated");
        on_node(dir, &node);
        Ok(node)
    }

    /// Hash every resource definition and resolve its title
    fn read_resources(
        &self,
        files: &[ResourceFile],
        leaf_hashes: &mut Vec<ContentHash>,
    ) -> Result<Vec<ResourceRef>, BuildError> {
        let mut refs = Vec::with_capacity(files.len());
        for file in files {
            let bytes = std::fs::read(&file.path)
                .map_err(|e| BuildError::source_read(file.path.clone(), e))?;
            leaf_hashes.push(hasher::compute_leaf_hash(&bytes));
            refs.push(ResourceRef {
                id: file.id.clone(),
                title: resource_title(&file.path, &file.id, &bytes),
            });
        }
        refs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(refs)
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn resource_title(path: &Path, id: &str, bytes: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(value) => value
            .get("title")
            .and_then(|title| title.as_str())
            .filter(|title| !title.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format_label(id)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Resource definition is not valid JSON");
            format_label(id)
        }
    }
}
