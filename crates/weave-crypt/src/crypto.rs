//! X25519 key agreement and XChaCha20-Poly1305 authenticated encryption.
//!
//! Encryption keys are never the Ed25519 signing key itself. A wallet's
//! X25519 secret is derived from its Ed25519 private key with a labeled
//! Blake3 KDF, and every symmetric key is derived from a Diffie-Hellman
//! output under its own label.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    Key, XChaCha20Poly1305, XNonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use x25519_dalek::{PublicKey, StaticSecret};

use weave_core::{derive_key, hexutil, CoreError};

use crate::error::{CryptError, Result};

/// KDF label turning an Ed25519 private key into an X25519 secret.
pub const X25519_FROM_ED25519_CONTEXT: &str = "weave-sdk 2024-06-01 x25519 secret from ed25519";

/// KDF label for one-shot message keys.
pub const MESSAGE_KEY_CONTEXT: &str = "weave-sdk 2024-06-01 envelope message key";

/// KDF label for static shared secrets between two wallets.
pub const SHARED_SECRET_CONTEXT: &str = "weave-sdk 2024-06-01 static shared secret";

/// An X25519 public key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct X25519PublicKey(
    #[serde(serialize_with = "hexutil::serde_array::serialize")] pub [u8; 32],
);

impl<'de> Deserialize<'de> for X25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        hexutil::serde_array::deserialize_field(deserializer, "x25519 public key").map(Self)
    }
}

impl X25519PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(Self(hexutil::decode_array("x25519 public key", s)?))
    }

    fn to_dalek(self) -> PublicKey {
        PublicKey::from(self.0)
    }
}

impl fmt::Debug for X25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X25519PublicKey({})", &self.to_hex()[..16])
    }
}

impl From<PublicKey> for X25519PublicKey {
    fn from(pk: PublicKey) -> Self {
        Self(*pk.as_bytes())
    }
}

/// An X25519 static secret.
///
/// Only used for key agreement, never for signing.
pub struct X25519StaticSecret(StaticSecret);

impl X25519StaticSecret {
    /// Generate a new random secret from OS entropy.
    pub fn generate() -> Self {
        Self(StaticSecret::random_from_rng(OsRng))
    }

    /// Create from raw scalar bytes (clamped on use).
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(StaticSecret::from(bytes))
    }

    /// Derive the public key.
    pub fn public_key(&self) -> X25519PublicKey {
        X25519PublicKey::from(PublicKey::from(&self.0))
    }

    /// Perform key agreement with a peer's public key.
    pub fn diffie_hellman(&self, peer_public: &X25519PublicKey) -> SharedKey {
        let shared = self.0.diffie_hellman(&peer_public.to_dalek());
        SharedKey(*shared.as_bytes())
    }
}

impl fmt::Debug for X25519StaticSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("X25519StaticSecret")
            .field("public", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Raw output of an X25519 key agreement.
///
/// Never used as a key directly; call [`SharedKey::derive_encryption_key`].
#[derive(Clone)]
pub struct SharedKey([u8; 32]);

impl SharedKey {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Derive a symmetric key under `context`, binding any extra `info`.
    pub fn derive_encryption_key(&self, context: &str, info: &[u8]) -> EncryptionKey {
        let mut hasher = blake3::Hasher::new_derive_key(context);
        hasher.update(&self.0);
        hasher.update(info);
        EncryptionKey(*hasher.finalize().as_bytes())
    }
}

/// A 256-bit symmetric key for XChaCha20-Poly1305.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey([u8; 32]);

impl EncryptionKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create from a slice that must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr = <[u8; 32]>::try_from(bytes).map_err(|_| CoreError::InvalidKeyLength {
            expected: 32,
            got: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new(Key::from_slice(&self.0))
    }

    /// Encrypt; the output carries the 16-byte Poly1305 tag.
    pub fn encrypt(&self, plaintext: &[u8], nonce: &EncryptionNonce) -> Result<Vec<u8>> {
        self.cipher()
            .encrypt(XNonce::from_slice(&nonce.0), plaintext)
            .map_err(|e| CryptError::Encryption(e.to_string()))
    }

    /// Decrypt and authenticate.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &EncryptionNonce) -> Result<Vec<u8>> {
        self.cipher()
            .decrypt(XNonce::from_slice(&nonce.0), ciphertext)
            .map_err(|_| CryptError::DecryptionFailed)
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(..)")
    }
}

/// A 192-bit XChaCha20 nonce. Random nonces of this size are safe to use
/// without a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncryptionNonce(
    #[serde(serialize_with = "hexutil::serde_array::serialize")] pub [u8; 24],
);

impl<'de> Deserialize<'de> for EncryptionNonce {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        hexutil::serde_array::deserialize_field(deserializer, "nonce").map(Self)
    }
}

impl EncryptionNonce {
    pub const LEN: usize = 24;

    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 24];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; 24]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 24] {
        &self.0
    }
}

/// Derive a wallet's X25519 secret from its 32-byte Ed25519 private key.
pub fn ed25519_to_x25519_secret(ed25519_private: &[u8]) -> Result<X25519StaticSecret> {
    if ed25519_private.len() != 32 {
        return Err(CoreError::InvalidKeyLength {
            expected: 32,
            got: ed25519_private.len(),
        }
        .into());
    }
    Ok(X25519StaticSecret::from_bytes(derive_key(
        X25519_FROM_ED25519_CONTEXT,
        ed25519_private,
    )))
}

/// Public half of [`ed25519_to_x25519_secret`].
pub fn ed25519_to_x25519_public(ed25519_private: &[u8]) -> Result<X25519PublicKey> {
    Ok(ed25519_to_x25519_secret(ed25519_private)?.public_key())
}

/// Static shared key between `my_ed25519_private` and a peer.
///
/// Both sides compute the same key: `A(priv) x B(pub) == B(priv) x A(pub)`.
pub fn derive_shared_secret(
    my_ed25519_private: &[u8],
    their_public: &X25519PublicKey,
) -> Result<EncryptionKey> {
    let secret = ed25519_to_x25519_secret(my_ed25519_private)?;
    Ok(secret
        .diffie_hellman(their_public)
        .derive_encryption_key(SHARED_SECRET_CONTEXT, &[]))
}
