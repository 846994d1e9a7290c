//! In-memory sparse Merkle tree.
//!
//! Computes roots and sibling paths with exactly the hashing rules the
//! verifier applies. Useful for reconstructing an expected root from a known
//! set of balances and for producing proofs in tests.

use std::collections::BTreeMap;

use weave_core::Blake3Hash;

use crate::proof::{bit_at, combine, leaf_for, SmtProof, EMPTY_HASH, TREE_DEPTH};

/// A sparse Merkle tree over 32-byte keys.
///
/// Keys are kept in byte order, which is also MSB-first bit order, so every
/// subtree is a contiguous range of the sorted entries.
#[derive(Debug, Clone, Default)]
pub struct SparseMerkleTree {
    leaves: BTreeMap<[u8; 32], Vec<u8>>,
}

impl SparseMerkleTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`. An empty value removes the key.
    pub fn insert(&mut self, key: Blake3Hash, value: Vec<u8>) {
        if value.is_empty() {
            self.leaves.remove(&key.0);
        } else {
            self.leaves.insert(key.0, value);
        }
    }

    pub fn remove(&mut self, key: &Blake3Hash) -> Option<Vec<u8>> {
        self.leaves.remove(&key.0)
    }

    pub fn get(&self, key: &Blake3Hash) -> Option<&[u8]> {
        self.leaves.get(&key.0).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    fn entries(&self) -> Vec<(Blake3Hash, Blake3Hash)> {
        self.leaves
            .iter()
            .map(|(k, v)| {
                let key = Blake3Hash::from_bytes(*k);
                (key, leaf_for(&key, v))
            })
            .collect()
    }

    /// Current root hash.
    pub fn root(&self) -> Blake3Hash {
        subtree_hash(&self.entries(), 0)
    }

    /// Build an inclusion proof (or non-inclusion proof if `key` is absent).
    pub fn proof(&self, key: &Blake3Hash) -> SmtProof {
        let entries = self.entries();
        let mut siblings = Vec::with_capacity(TREE_DEPTH);
        let mut range: &[(Blake3Hash, Blake3Hash)] = &entries;

        for depth in 0..TREE_DEPTH {
            let split = range.partition_point(|(k, _)| !bit_at(k, depth));
            let (left, right) = range.split_at(split);
            if bit_at(key, depth) {
                siblings.push(subtree_hash(left, depth + 1));
                range = right;
            } else {
                siblings.push(subtree_hash(right, depth + 1));
                range = left;
            }
        }

        SmtProof {
            root: subtree_hash(&entries, 0),
            key: *key,
            value: self.get(key).map(<[u8]>::to_vec).unwrap_or_default(),
            siblings,
        }
    }
}

/// Hash of the subtree rooted at `depth` holding exactly `entries`.
fn subtree_hash(entries: &[(Blake3Hash, Blake3Hash)], depth: usize) -> Blake3Hash {
    match entries {
        [] => EMPTY_HASH,
        [(_, leaf)] if depth == TREE_DEPTH => *leaf,
        _ => {
            let split = entries.partition_point(|(k, _)| !bit_at(k, depth));
            let (left, right) = entries.split_at(split);
            combine(
                &subtree_hash(left, depth + 1),
                &subtree_hash(right, depth + 1),
            )
        }
    }
}
