//! Proof hashing rules and the 256-step root recomputation.

use serde::{Deserialize, Serialize};
use weave_core::Blake3Hash;

use crate::error::{Result, SmtError};

/// Number of levels in the tree (one per key bit).
pub const TREE_DEPTH: usize = 256;

/// Hash of an absent leaf or an all-empty subtree.
pub const EMPTY_HASH: Blake3Hash = Blake3Hash::ZERO;

const LEAF_PREFIX: u8 = 0x00;
const INTERNAL_PREFIX: u8 = 0x01;

/// Leaf hash: `H(0x00 || key || value_hash)`.
pub fn hash_leaf(key: &Blake3Hash, value_hash: &Blake3Hash) -> Blake3Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&[LEAF_PREFIX]);
    hasher.update(key.as_bytes());
    hasher.update(value_hash.as_bytes());
    Blake3Hash::from_bytes(*hasher.finalize().as_bytes())
}

/// Internal node hash: `H(0x01 || left || right)`.
pub fn hash_internal(left: &Blake3Hash, right: &Blake3Hash) -> Blake3Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&[INTERNAL_PREFIX]);
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    Blake3Hash::from_bytes(*hasher.finalize().as_bytes())
}

/// Combine two children, collapsing a pair of empty subtrees to empty.
pub(crate) fn combine(left: &Blake3Hash, right: &Blake3Hash) -> Blake3Hash {
    if *left == EMPTY_HASH && *right == EMPTY_HASH {
        EMPTY_HASH
    } else {
        hash_internal(left, right)
    }
}

/// Bit of `key` at `depth`, most significant bit of byte 0 first.
pub fn bit_at(key: &Blake3Hash, depth: usize) -> bool {
    (key.0[depth / 8] >> (7 - (depth % 8))) & 1 == 1
}

/// Leaf hash for a value; empty values denote absence.
pub(crate) fn leaf_for(key: &Blake3Hash, value: &[u8]) -> Blake3Hash {
    if value.is_empty() {
        EMPTY_HASH
    } else {
        hash_leaf(key, &Blake3Hash::hash(value))
    }
}

/// Recompute the root implied by a leaf and its sibling path.
///
/// `siblings[d]` is the sibling at depth `d`; the walk runs from depth 255
/// up to the root.
pub fn compute_root(
    key: &Blake3Hash,
    value: &[u8],
    siblings: &[Blake3Hash],
) -> Result<Blake3Hash> {
    if siblings.len() != TREE_DEPTH {
        tracing::debug!(siblings = siblings.len(), "rejecting malformed proof");
        return Err(SmtError::MalformedProof {
            siblings: siblings.len(),
        });
    }

    let mut current = leaf_for(key, value);
    for depth in (0..TREE_DEPTH).rev() {
        let sibling = &siblings[depth];
        current = if bit_at(key, depth) {
            combine(sibling, &current)
        } else {
            combine(&current, sibling)
        };
    }
    Ok(current)
}

/// Check a proof, returning the reason on failure.
pub fn check_proof(
    root: &Blake3Hash,
    key: &Blake3Hash,
    value: &[u8],
    siblings: &[Blake3Hash],
) -> Result<()> {
    let computed = compute_root(key, value, siblings)?;
    if computed != *root {
        tracing::debug!(
            claimed = %root.to_hex(),
            computed = %computed.to_hex(),
            "proof mismatch"
        );
        return Err(SmtError::ProofMismatch {
            claimed: root.to_hex(),
            computed: computed.to_hex(),
        });
    }
    Ok(())
}

/// Returns `true` iff `(key, value)` is consistent with `root`.
///
/// An empty `value` claims non-inclusion. Malformed proofs return `false`
/// without hashing.
pub fn verify(
    root: &Blake3Hash,
    key: &Blake3Hash,
    value: &[u8],
    siblings: &[Blake3Hash],
) -> bool {
    check_proof(root, key, value, siblings).is_ok()
}

/// A self-contained inclusion or non-inclusion proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtProof {
    pub root: Blake3Hash,
    pub key: Blake3Hash,
    /// Empty for a non-inclusion claim.
    #[serde(with = "hex_vec")]
    pub value: Vec<u8>,
    pub siblings: Vec<Blake3Hash>,
}

impl SmtProof {
    pub fn verify(&self) -> bool {
        verify(&self.root, &self.key, &self.value, &self.siblings)
    }

    pub fn check(&self) -> Result<()> {
        check_proof(&self.root, &self.key, &self.value, &self.siblings)
    }

    /// Whether this proof claims the key is absent.
    pub fn is_non_inclusion(&self) -> bool {
        self.value.is_empty()
    }
}

mod hex_vec {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        weave_core::hexutil::decode("value", &s).map_err(D::Error::custom)
    }
}
