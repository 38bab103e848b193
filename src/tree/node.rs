//! Node descriptor types
//!
//! A `TreeNode` is both the in-memory result of aggregation and the exact
//! shape of the `meta.json` document published for each tree location.

use crate::types::ContentHash;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reference to one quiz or flashcard deck attached to a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    /// File stem of the resource definition
    pub id: String,
    pub title: String,
}

/// Quiz and flashcard resources of a node
///
/// A category is `Some` whenever its folder exists, even if the folder holds
/// no definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_quizzes: Option<Vec<ResourceRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flashcard_decks: Option<Vec<ResourceRef>>,
}

impl Resources {
    pub fn is_empty(&self) -> bool {
        self.collection_quizzes.is_none() && self.flashcard_decks.is_none()
    }
}

/// One location of the content tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub has_index: bool,
    pub is_branch: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, TreeNode>,
    pub hash: ContentHash,
}

impl TreeNode {
    /// Total number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.values().map(TreeNode::node_count).sum::<usize>()
    }

    /// Look up a descendant by its path of child names
    pub fn descendant<S: AsRef<str>>(&self, path: &[S]) -> Option<&TreeNode> {
        path.iter()
            .try_fold(self, |node, name| node.children.get(AsRef::<str>::as_ref(name)))
    }

    /// Visit every node in post-order (children before their parent)
    ///
    /// The callback receives the path of child names from this node.
    pub fn visit_post_order<F>(&self, visit: &mut F)
    where
        F: FnMut(&[String], &TreeNode),
    {
        let mut path = Vec::new();
        self.visit_inner(&mut path, visit);
    }

    fn visit_inner<F>(&self, path: &mut Vec<String>, visit: &mut F)
    where
        F: FnMut(&[String], &TreeNode),
    {
        for (name, child) in &self.children {
            path.push(name.clone());
            child.visit_inner(path, visit);
            path.pop();
        }
        visit(path, self);
    }
}
