//! Structural hashing primitives.
//!
//! Every node folds, in this exact order, its type tag, its own local data
//! and the hashes of its direct children into a [NodeDigest]. The resulting
//! [StructuralHash] is a content fingerprint: two subtrees with equal types,
//! content and child order hash identically, no matter how they were built.
//!
//! The digest is 128-bit XXH3. It is not collision resistant against an
//! adversary, which is fine for comparing documents.

use std::fmt;
use xxhash_rust::xxh3::Xxh3;

/// Number of bytes in a [StructuralHash].
pub const HASH_LEN: usize = 16;

// =#========================================================================#=
// STRUCTURAL HASH
// =#========================================================================#=
/// Fixed-size content fingerprint of a subtree.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructuralHash([u8; HASH_LEN]);

impl StructuralHash {
    /// Returns the raw hash bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }
}

impl fmt::Display for StructuralHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for StructuralHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StructuralHash({self})")
    }
}

// =#========================================================================#=
// FINGERPRINT
// =#========================================================================#=
/// Hash and weight of an initialized subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    /// Structural hash of the subtree
    pub hash: StructuralHash,
    /// Number of weighted items in the subtree
    pub weight: usize,
}

// =#========================================================================#=
// NODE DIGEST
// =#========================================================================#=
/// Scratch digest that a node folds its data into.
///
/// Strings are length-prefixed and optional values carry a presence byte,
/// so that `("ab", "c")` and `("a", "bc")` never fold to the same stream.
pub struct NodeDigest {
    state: Xxh3,
}

impl NodeDigest {
    pub(crate) fn new() -> Self {
        Self { state: Xxh3::new() }
    }

    /// Folds a node type tag.
    pub fn tag(&mut self, tag: u8) {
        self.state.update(&[tag]);
    }

    /// Folds a string.
    pub fn str(&mut self, value: &str) {
        self.state.update(&(value.len() as u64).to_le_bytes());
        self.state.update(value.as_bytes());
    }

    /// Folds a count.
    pub fn len(&mut self, count: usize) {
        self.state.update(&(count as u64).to_le_bytes());
    }

    /// Folds an optional string.
    pub fn opt_str(&mut self, value: Option<&str>) {
        match value {
            Some(value) => {
                self.state.update(&[1]);
                self.str(value);
            }
            None => self.state.update(&[0]),
        }
    }

    /// Folds the hash of a child.
    pub fn child(&mut self, hash: &StructuralHash) {
        self.state.update(hash.as_bytes());
    }

    pub(crate) fn finish(&self) -> StructuralHash {
        StructuralHash(self.state.digest128().to_be_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_folding_is_unambiguous() {
        let mut left = NodeDigest::new();
        left.str("ab");
        left.str("c");
        let mut right = NodeDigest::new();
        right.str("a");
        right.str("bc");
        assert_ne!(left.finish(), right.finish());
    }

    #[test]
    fn test_absent_differs_from_empty() {
        let mut absent = NodeDigest::new();
        absent.opt_str(None);
        let mut empty = NodeDigest::new();
        empty.opt_str(Some(""));
        assert_ne!(absent.finish(), empty.finish());
    }

    #[test]
    fn test_display_is_hex() {
        let digest = NodeDigest::new();
        let shown = digest.finish().to_string();
        assert_eq!(shown.len(), 2 * HASH_LEN);
        assert!(shown.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
