//! # Weave
//!
//! Client-side SDK for the Weave ledger.
//!
//! ## Overview
//!
//! - **Wallets**: one Ed25519 key, a 20-byte address derived from it
//! - **Knots**: signed state transitions, built canonically and submitted
//!   as hex
//! - **State proofs**: balances checked against a sparse Merkle root
//!   without trusting the node
//! - **Messaging**: sealed messages and signed chat events between wallets
//!
//! ## Usage
//!
//! ```rust
//! use weave::{Knot, TransferParams, Weave, WeaveConfig};
//!
//! let weave = Weave::from_hex(&"01".repeat(32), WeaveConfig::default()).unwrap();
//! let wire = weave
//!     .send("0x0202020202020202020202020202020202020202", "2.5")
//!     .unwrap();
//!
//! let knot = Knot::from_hex(&wire).unwrap();
//! assert_eq!(knot.before_states[0].thread_id, weave.address());
//! knot.verify().unwrap();
//! ```
//!
//! ## Re-exports
//!
//! - `weave::core` - Codec, identifiers, hashing and signatures
//! - `weave::smt` - Sparse Merkle proof verification
//! - `weave::knot` - Wallets and knot construction
//! - `weave::crypt` - Encryption and chat events

pub mod client;
pub mod error;

pub use weave_core as core;
pub use weave_crypt as crypt;
pub use weave_knot as knot;
pub use weave_smt as smt;

pub use client::{Weave, WeaveConfig};
pub use error::{Result, WeaveError};

pub use weave_core::{Address, Blake3Hash, Ed25519PublicKey, KnotId, LoomId, TokenId};
pub use weave_crypt::{ChatEvent, EncryptedMessage, X25519PublicKey};
pub use weave_knot::{
    format_amount, parse_amount, ConfirmationConfig, Knot, KnotType, LoomDeployParams, LoomQuery,
    LoomUploadParams, TokenBurnParams, TokenDefinitionParams, TokenMintParams, TransferParams,
    Wallet,
};
pub use weave_smt::StateProofResponse;
