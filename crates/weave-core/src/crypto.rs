//! Hashing and signature primitives.
//!
//! Blake3 is both the content hash and, through [`derive_key`], the key
//! derivation function. Ed25519 keys and signatures travel as raw fixed-size
//! byte strings on the wire and as plain lowercase hex everywhere else.

use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CoreError, Result};
use crate::hexutil;
use crate::types::Address;

/// Derive 32 bytes of key material under a domain-separation label.
///
/// The label must be a hardcoded, globally unique context string; two
/// different labels never produce related keys for the same input.
pub fn derive_key(context: &str, material: &[u8]) -> [u8; 32] {
    blake3::derive_key(context, material)
}

/// Declares a fixed-size byte newtype that serializes as hex.
macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:literal, $label:literal, $field:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub struct $name(
            #[serde(serialize_with = "hexutil::serde_array::serialize")] pub [u8; $len],
        );

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                hexutil::serde_array::deserialize_field(deserializer, $field).map(Self)
            }
        }

        impl $name {
            pub const LEN: usize = $len;

            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Lowercase hex without prefix.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Parse from hex, with or without the `0x` prefix.
            pub fn from_hex(s: &str) -> Result<Self> {
                hexutil::decode_array($field, s).map(Self)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({}..)"), &self.to_hex()[..16])
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }
    };
}

fixed_bytes!(
    /// A 32-byte Blake3 digest.
    Blake3Hash,
    32,
    "Blake3",
    "hash"
);

fixed_bytes!(
    /// A 32-byte Ed25519 public key, as carried in knots and chat events.
    Ed25519PublicKey,
    32,
    "Ed25519Pub",
    "public key"
);

fixed_bytes!(
    /// A 64-byte Ed25519 signature.
    Ed25519Signature,
    64,
    "Ed25519Sig",
    "signature"
);

impl Blake3Hash {
    /// The all-zero hash. Also the empty-subtree marker in the state tree.
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn hash(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Hash the concatenation of `parts`.
    pub fn hash_parts(parts: &[&[u8]]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(part);
        }
        Self(*hasher.finalize().as_bytes())
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Ed25519PublicKey {
    /// The thread address owned by this key.
    pub fn address(&self) -> Address {
        Address::from_public_key(self)
    }

    /// Check `signature` over `message`.
    ///
    /// Fails with [`CoreError::InvalidPublicKey`] when the bytes are not a
    /// curve point, and [`CoreError::SignatureInvalid`] otherwise.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<()> {
        let key = VerifyingKey::from_bytes(&self.0).map_err(|_| CoreError::InvalidPublicKey)?;
        key.verify(message, &Signature::from_bytes(&signature.0))
            .map_err(|_| CoreError::SignatureInvalid)
    }
}

impl Ed25519Signature {
    /// Placeholder for unsigned structures; never verifies.
    pub const ZERO: Self = Self([0u8; 64]);
}

/// An Ed25519 signing key.
///
/// The 32-byte seed is the wallet's private key. Debug output shows only the
/// public half.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Fresh key from the OS CSPRNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Like [`Keypair::from_seed`], for input of unchecked length.
    pub fn from_slice(seed: &[u8]) -> Result<Self> {
        let seed = <&[u8; 32]>::try_from(seed).map_err(|_| CoreError::InvalidKeyLength {
            expected: 32,
            got: seed.len(),
        })?;
        Ok(Self::from_seed(seed))
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    pub fn address(&self) -> Address {
        self.public_key().address()
    }

    /// Deterministic Ed25519 signature; the same key and message always give
    /// the same bytes.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message).to_bytes())
    }

    /// The secret seed.
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Keypair").field(&self.public_key()).finish()
    }
}
