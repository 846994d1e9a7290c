//! # Weave SMT
//!
//! Verification of sparse Merkle tree proofs against ledger state roots.
//!
//! ## Tree Shape
//!
//! The tree has a fixed depth of 256, one level per bit of a 32-byte key,
//! most significant bit first. Hashing rules:
//!
//! - leaf: `H(0x00 || key || H(value))`
//! - internal: `H(0x01 || left || right)`
//! - empty: 32 zero bytes
//!
//! Two empty children collapse to the empty hash rather than to
//! `H(0x01 || empty || empty)`, so untouched subtrees stay canonical.
//!
//! ## Usage
//!
//! ```rust
//! use weave_smt::{verify, SparseMerkleTree};
//! use weave_core::Blake3Hash;
//!
//! let mut tree = SparseMerkleTree::new();
//! let key = Blake3Hash::hash(b"alice");
//! tree.insert(key, b"100".to_vec());
//!
//! let proof = tree.proof(&key);
//! assert!(verify(&tree.root(), &key, b"100", &proof.siblings));
//! ```

pub mod balance;
pub mod error;
pub mod proof;
pub mod tree;

pub use balance::{
    balance_key, encode_balance, verify_balance, verify_balance_hex, BalanceValue,
    StateProofResponse,
};
pub use error::{Result, SmtError};
pub use proof::{
    bit_at, check_proof, compute_root, hash_internal, hash_leaf, verify, SmtProof, EMPTY_HASH,
    TREE_DEPTH,
};
pub use tree::SparseMerkleTree;
