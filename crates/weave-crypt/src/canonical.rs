//! Deterministic CBOR (RFC 8949 core deterministic encoding).
//!
//! - Integers and lengths use the shortest form
//! - Definite lengths only
//! - Map keys sorted by their encoded bytes
//! - No floats, no tags
//!
//! Used wherever a hash must be identical across implementations, which in
//! this crate means chat event ids.

use ciborium::value::{Integer, Value};

use crate::error::{CryptError, Result};

/// Encode `value` canonically.
pub fn to_canonical_bytes(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value)?;
    Ok(buf)
}

fn encode_value_to(buf: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_string(buf, 2, b),
        Value::Text(s) => encode_string(buf, 3, s.as_bytes()),
        Value::Array(items) => {
            encode_head(buf, 4, items.len() as u64);
            for item in items {
                encode_value_to(buf, item)?;
            }
        }
        Value::Map(entries) => encode_map(buf, entries)?,
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        Value::Float(_) => return Err(CryptError::NonCanonical("float")),
        Value::Tag(..) => return Err(CryptError::NonCanonical("tag")),
        _ => return Err(CryptError::NonCanonical("value")),
    }
    Ok(())
}

fn encode_integer(buf: &mut Vec<u8>, i: Integer) {
    let n: i128 = i.into();
    if n >= 0 {
        encode_head(buf, 0, n as u64);
    } else {
        // -1 encodes as 0, -2 as 1, ...
        encode_head(buf, 1, (-1 - n) as u64);
    }
}

/// Head followed by a raw payload (byte and text strings).
fn encode_string(buf: &mut Vec<u8>, major: u8, payload: &[u8]) {
    encode_head(buf, major, payload.len() as u64);
    buf.extend_from_slice(payload);
}

fn encode_head(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

fn encode_map(buf: &mut Vec<u8>, entries: &[(Value, Value)]) -> Result<()> {
    let mut pairs = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        let mut key = Vec::new();
        encode_value_to(&mut key, k)?;
        pairs.push((key, v));
    }
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_head(buf, 5, pairs.len() as u64);
    for (key, value) in pairs {
        buf.extend_from_slice(&key);
        encode_value_to(buf, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(v: Value) -> Vec<u8> {
        to_canonical_bytes(&v).unwrap()
    }

    #[test]
    fn test_integer_shortest_form() {
        assert_eq!(enc(Value::Integer(0.into())), [0x00]);
        assert_eq!(enc(Value::Integer(23.into())), [0x17]);
        assert_eq!(enc(Value::Integer(24.into())), [0x18, 24]);
        assert_eq!(enc(Value::Integer(256.into())), [0x19, 0x01, 0x00]);
        assert_eq!(enc(Value::Integer(65_536.into())), [0x1a, 0, 1, 0, 0]);
        assert_eq!(
            enc(Value::Integer(u64::MAX.into())),
            [0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
        assert_eq!(enc(Value::Integer((-1).into())), [0x20]);
        assert_eq!(enc(Value::Integer((-25).into())), [0x38, 24]);
    }

    #[test]
    fn test_strings_and_arrays() {
        assert_eq!(enc(Value::Text("a".into())), [0x61, b'a']);
        assert_eq!(enc(Value::Bytes(vec![1, 2])), [0x42, 1, 2]);
        assert_eq!(
            enc(Value::Array(vec![Value::Null, Value::Bool(true)])),
            [0x82, 0xf6, 0xf5]
        );
    }

    #[test]
    fn test_map_keys_sorted_by_encoding() {
        let a = Value::Map(vec![
            (Value::Text("bb".into()), Value::Integer(1.into())),
            (Value::Text("a".into()), Value::Integer(2.into())),
            (Value::Integer(10.into()), Value::Integer(3.into())),
        ]);
        let b = Value::Map(vec![
            (Value::Integer(10.into()), Value::Integer(3.into())),
            (Value::Text("a".into()), Value::Integer(2.into())),
            (Value::Text("bb".into()), Value::Integer(1.into())),
        ]);
        let bytes = enc(a);
        assert_eq!(bytes, enc(b));
        // 10 < "a" < "bb" by encoded bytes.
        assert_eq!(&bytes[..2], &[0xa3, 0x0a]);
    }

    #[test]
    fn test_float_rejected() {
        assert!(matches!(
            to_canonical_bytes(&Value::Array(vec![Value::Float(1.5)])),
            Err(CryptError::NonCanonical("float"))
        ));
    }

    #[test]
    fn test_decodes_with_ciborium() {
        let value = Value::Array(vec![
            Value::Bytes(vec![9; 32]),
            Value::Integer(1.into()),
            Value::Text("hello".into()),
        ]);
        let bytes = enc(value.clone());
        let back: Value = ciborium::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(back, value);
    }
}
