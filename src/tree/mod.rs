//! Content Merkle Tree
//!
//! Represents a content directory as a tree of node descriptors, where each
//! node carries a deterministic hash over its own content units and its
//! children's hashes.

pub mod builder;
pub mod front_matter;
pub mod hasher;
pub mod label;
pub mod node;
pub mod walker;

pub use builder::TreeBuilder;
pub use node::{ResourceRef, Resources, TreeNode};
