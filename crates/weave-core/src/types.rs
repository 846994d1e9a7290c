//! Strong type definitions for the Weave SDK.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::crypto::{Blake3Hash, Ed25519PublicKey};
use crate::error::Result;
use crate::hexutil;

/// A 20-byte thread address: the first 20 bytes of Blake3(public key).
///
/// The canonical text form is lowercase hex with a `0x` prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const LEN: usize = 20;

    /// Derive the address owned by a public key.
    pub fn from_public_key(pubkey: &Ed25519PublicKey) -> Self {
        let digest = Blake3Hash::hash(pubkey.as_bytes());
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest.0[..20]);
        Self(out)
    }

    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from hex, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self> {
        hexutil::decode_array("address", s).map(Self)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl std::str::FromStr for Address {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

/// Declares a 32-byte identifier newtype with hex helpers.
macro_rules! id32 {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name(
            #[serde(serialize_with = "hexutil::serde_array::serialize")] pub [u8; 32],
        );

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                hexutil::serde_array::deserialize_field(deserializer, $field).map(Self)
            }
        }

        impl $name {
            pub const fn from_bytes(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub const fn as_bytes(&self) -> &[u8; 32] {
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
                write!(f, "{}({})", stringify!($name), &self.to_hex()[..16])
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

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl From<Blake3Hash> for $name {
            fn from(hash: Blake3Hash) -> Self {
                Self(hash.0)
            }
        }
    };
}

id32!(
    /// A 32-byte token identifier. The all-zero value is the native token.
    TokenId,
    "token_id"
);

id32!(
    /// Content hash of a signed knot.
    KnotId,
    "knot_id"
);

id32!(
    /// Identifier of a deployed loom (the id of its deploy knot).
    LoomId,
    "loom_id"
);

impl TokenId {
    /// The reserved native token.
    pub const NATIVE: Self = Self([0u8; 32]);

    pub fn is_native(&self) -> bool {
        *self == Self::NATIVE
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::NATIVE
    }
}

impl KnotId {
    pub const ZERO: Self = Self([0u8; 32]);
}

impl From<KnotId> for LoomId {
    fn from(id: KnotId) -> Self {
        Self(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    #[test]
    fn test_address_deterministic() {
        let pk = Keypair::from_seed(&[0x01; 32]).public_key();
        assert_eq!(Address::from_public_key(&pk), Address::from_public_key(&pk));
    }

    #[test]
    fn test_address_is_truncated_hash() {
        let pk = Ed25519PublicKey::from_bytes([0x07; 32]);
        let digest = Blake3Hash::hash(&[0x07; 32]);
        assert_eq!(Address::from_public_key(&pk).0[..], digest.0[..20]);
    }

    #[test]
    fn test_address_hex_form() {
        let addr = Address::from_bytes([0x02; 20]);
        assert_eq!(addr.to_hex(), format!("0x{}", "02".repeat(20)));
        assert_eq!(Address::from_hex(&addr.to_hex()).unwrap(), addr);
        assert_eq!(Address::from_hex(&"02".repeat(20)).unwrap(), addr);
    }

    #[test]
    fn test_address_wrong_length() {
        assert!(Address::from_hex("0x0102").is_err());
    }

    #[test]
    fn test_address_serde() {
        let addr = Address::from_bytes([0xab; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(20)));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_native_token() {
        assert!(TokenId::NATIVE.is_native());
        assert!(TokenId::default().is_native());
        assert!(!TokenId::from_bytes([1; 32]).is_native());
    }

    #[test]
    fn test_id_display_and_debug() {
        let id = KnotId::from_bytes([0xcd; 32]);
        assert_eq!(format!("{}", id), "cd".repeat(32));
        assert!(format!("{:?}", id).starts_with("KnotId("));
    }
}
