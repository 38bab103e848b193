//! Hash computation for content units and tree nodes using BLAKE3

use crate::types::ContentHash;
use blake3::Hasher;

/// Compute the hash of one content unit
///
/// Hashes the exact bytes given. Whitespace, encoding and line endings are
/// not normalized, so a cosmetic edit produces a different hash.
pub fn compute_leaf_hash(content: &[u8]) -> ContentHash {
    let mut hasher = Hasher::new();
    hasher.update(content);
    ContentHash::from_blake3(hasher.finalize())
}

/// Compute a node hash from its leaf hashes and its children's hashes
///
/// node_hash = hash(concat(sort_ascending(leaves ++ children)))
///
/// Sorting makes the result independent of the order in which files and
/// directories were listed. With no inputs this is the hash of the empty string.
pub fn aggregate_hashes<I>(hashes: I) -> ContentHash
where
    I: IntoIterator<Item = ContentHash>,
{
    let mut sorted: Vec<ContentHash> = hashes.into_iter().collect();
    sorted.sort();

    let mut hasher = Hasher::new();
    for hash in &sorted {
        hasher.update(hash.as_str().as_bytes());
    }
    ContentHash::from_blake3(hasher.finalize())
}
