//! Hex helpers shared by every textual byte form in the SDK.
//!
//! Inputs may carry an optional `0x` prefix; outputs are always lowercase.

use crate::error::{CoreError, Result};

/// Strip an optional `0x`/`0X` prefix.
pub fn strip_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Decode a hex string of any length.
pub fn decode(field: &'static str, s: &str) -> Result<Vec<u8>> {
    hex::decode(strip_prefix(s)).map_err(|e| CoreError::InvalidHex {
        field,
        reason: e.to_string(),
    })
}

/// Decode a hex string that must hold exactly `N` bytes.
pub fn decode_array<const N: usize>(field: &'static str, s: &str) -> Result<[u8; N]> {
    let bytes = decode(field, s)?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| CoreError::InvalidLength {
        field,
        expected: N,
        got: bytes.len(),
    })
}

/// Serde helpers: fixed-size byte arrays as plain lowercase hex.
///
/// Deserialization takes the field label, so a bad value reports which
/// field it was meant for. Pair [`serialize`](serde_array::serialize) with
/// a `Deserialize` impl that calls
/// [`deserialize_field`](serde_array::deserialize_field).
pub mod serde_array {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer, const N: usize>(
        bytes: &[u8; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize_field<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
        field: &'static str,
    ) -> Result<[u8; N], D::Error> {
        let s = String::deserialize(deserializer)?;
        super::decode_array::<N>(field, &s).map_err(D::Error::custom)
    }
}
