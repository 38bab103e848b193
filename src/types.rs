//! Shared value types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowercase hex digest identifying a leaf or an aggregated node.
///
/// Ordering is plain lexicographic over the hex text, which is what node
/// aggregation sorts by. Deserialization goes through `from_hex`, so a
/// malformed digest in a manifest, descriptor or cache blob fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Length of the hex rendering (BLAKE3, 32 bytes).
    pub const HEX_LEN: usize = 64;

    /// Wrap an already-rendered hex digest.
    ///
    /// Returns `None` unless the input is exactly `HEX_LEN` lowercase hex chars.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let valid = hex.len() == Self::HEX_LEN
            && hex
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(hex.to_string()))
    }

    pub(crate) fn from_blake3(hash: blake3::Hash) -> Self {
        Self(hash.to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `n` hex characters, for log lines and tables.
    pub fn short(&self, n: usize) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(n)
            .map_or(self.0.len(), |(idx, _)| idx);
        &self.0[..end]
    }
}

impl TryFrom<String> for ContentHash {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ContentHash::from_hex(&value).ok_or_else(|| {
            format!(
                "invalid content hash {:?}: expected {} lowercase hex characters",
                value,
                Self::HEX_LEN
            )
        })
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a top-level collection (its directory name).
pub type CollectionId = String;
