//! # Weave Core
//!
//! Pure primitives for the Weave SDK: the ledger's binary codec, strongly
//! typed identifiers, and the hashing and signature wrappers everything
//! else is built on.
//!
//! This crate contains no I/O and no networking. It is pure computation
//! over byte strings.
//!
//! ## Key Types
//!
//! - [`Writer`] / [`Reader`] - Little-endian wire codec
//! - [`Address`] - 20-byte thread identifier derived from a public key
//! - [`TokenId`] - 32-byte token identifier (all-zero is the native token)
//! - [`Blake3Hash`] - Content hash and key-derivation primitive
//! - [`Keypair`] - Ed25519 signing key
//!
//! ## Encoding
//!
//! Every signed structure in the SDK is serialized with the codec in
//! [`codec`]. See that module for the exact byte layout of each primitive.

pub mod codec;
pub mod crypto;
pub mod error;
pub mod hexutil;
pub mod types;

pub use codec::{Reader, Writer};
pub use crypto::{derive_key, Blake3Hash, Ed25519PublicKey, Ed25519Signature, Keypair};
pub use error::{CoreError, Result};
pub use types::{Address, KnotId, LoomId, TokenId};
