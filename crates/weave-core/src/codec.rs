//! Binary codec matching the ledger's wire format.
//!
//! All integers are little-endian and fixed width. Variable-length data is
//! framed as follows:
//!
//! | primitive      | encoding                                           |
//! |----------------|----------------------------------------------------|
//! | `u8/u32/u64`   | 1 / 4 / 8 bytes LE                                 |
//! | `u128`         | 16 bytes LE                                        |
//! | fixed bytes    | raw, length agreed out of band                     |
//! | bytes          | `u32` LE length, then raw bytes                    |
//! | string         | UTF-8, then framed as bytes                        |
//! | option bytes   | `0x00`, or `0x01` followed by framed bytes         |
//! | option `u64`   | `0x00`, or `0x01` followed by 8 bytes LE           |
//!
//! Digests and signatures are computed over these bytes, so the layout is a
//! hard contract with the ledger. The reader never pads: any read that runs
//! past the end of the buffer fails with [`CoreError::Truncated`].

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{CoreError, Result};

const OPTION_NONE: u8 = 0;
const OPTION_SOME: u8 = 1;

/// Append-only encoder owning a growable buffer.
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: BytesMut,
}

impl Writer {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buf.put_u8(value);
        self
    }

    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.buf.put_u32_le(value);
        self
    }

    pub fn write_u64(&mut self, value: u64) -> &mut Self {
        self.buf.put_u64_le(value);
        self
    }

    /// Write a 16-byte little-endian unsigned integer.
    pub fn write_u128(&mut self, value: u128) -> &mut Self {
        self.buf.put_u128_le(value);
        self
    }

    /// Write raw bytes with no length prefix.
    pub fn write_fixed_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.put_slice(bytes);
        self
    }

    /// Write a `u32` length prefix followed by the bytes.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is longer than `u32::MAX`; such a blob cannot be
    /// represented on the wire.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        let len = u32::try_from(bytes.len()).unwrap_or_else(|_| {
            panic!("byte blob of {} bytes exceeds u32 length prefix", bytes.len())
        });
        self.buf.put_u32_le(len);
        self.buf.put_slice(bytes);
        self
    }

    pub fn write_string(&mut self, s: &str) -> &mut Self {
        self.write_bytes(s.as_bytes())
    }

    pub fn write_option_bytes(&mut self, bytes: Option<&[u8]>) -> &mut Self {
        match bytes {
            Some(b) => {
                self.buf.put_u8(OPTION_SOME);
                self.write_bytes(b)
            }
            None => {
                self.buf.put_u8(OPTION_NONE);
                self
            }
        }
    }

    pub fn write_option_string(&mut self, s: Option<&str>) -> &mut Self {
        self.write_option_bytes(s.map(str::as_bytes))
    }

    pub fn write_option_u64(&mut self, value: Option<u64>) -> &mut Self {
        match value {
            Some(v) => {
                self.buf.put_u8(OPTION_SOME);
                self.buf.put_u64_le(v);
            }
            None => self.buf.put_u8(OPTION_NONE),
        }
        self
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// View the bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer, returning the encoded bytes.
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

/// Cursor over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes left unconsumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Current cursor offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Fail unless every byte has been consumed.
    pub fn finish(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            extra => Err(CoreError::InvalidLength {
                field: "trailing bytes",
                expected: 0,
                got: extra,
            }),
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(CoreError::Truncated {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_u128(&mut self) -> Result<u128> {
        Ok(u128::from_le_bytes(self.read_array()?))
    }

    /// Read `len` raw bytes with no length prefix.
    pub fn read_fixed_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.take(len)
    }

    /// Read a `u32`-prefixed byte blob.
    pub fn read_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.take(len)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let raw = self.read_bytes()?;
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|_| CoreError::InvalidUtf8)
    }

    fn read_option_flag(&mut self) -> Result<bool> {
        match self.read_u8()? {
            OPTION_NONE => Ok(false),
            OPTION_SOME => Ok(true),
            other => Err(CoreError::InvalidOptionFlag(other)),
        }
    }

    pub fn read_option_bytes(&mut self) -> Result<Option<&'a [u8]>> {
        if self.read_option_flag()? {
            Ok(Some(self.read_bytes()?))
        } else {
            Ok(None)
        }
    }

    pub fn read_option_string(&mut self) -> Result<Option<String>> {
        if self.read_option_flag()? {
            Ok(Some(self.read_string()?))
        } else {
            Ok(None)
        }
    }

    pub fn read_option_u64(&mut self) -> Result<Option<u64>> {
        if self.read_option_flag()? {
            Ok(Some(self.read_u64()?))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_integer_layout() {
        let mut w = Writer::new();
        w.write_u8(0xab).write_u32(1).write_u64(0x0102030405060708);
        assert_eq!(
            w.as_slice(),
            &[0xab, 1, 0, 0, 0, 8, 7, 6, 5, 4, 3, 2, 1]
        );
    }

    #[test]
    fn test_u128_layout() {
        let mut w = Writer::new();
        w.write_u128(1_000_000_000_000);
        let bytes = w.into_vec();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..6], &[0x00, 0x10, 0xa5, 0xd4, 0xe8, 0x00]);
        assert!(bytes[6..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_u128_extremes_roundtrip() {
        let mut w = Writer::new();
        w.write_u128(0).write_u128(u128::MAX);
        let bytes = w.into_vec();
        assert_eq!(&bytes[..16], &[0u8; 16]);
        assert_eq!(&bytes[16..], &[0xffu8; 16]);

        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_u128().unwrap(), 0);
        assert_eq!(r.read_u128().unwrap(), u128::MAX);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_bytes_are_length_prefixed() {
        let mut w = Writer::new();
        w.write_bytes(b"abc");
        assert_eq!(w.as_slice(), &[3, 0, 0, 0, b'a', b'b', b'c']);
    }

    #[test]
    fn test_empty_string_and_blob() {
        let mut w = Writer::new();
        w.write_string("").write_bytes(&[]);
        let bytes = w.into_vec();
        assert_eq!(bytes, vec![0u8; 8]);

        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_string().unwrap(), "");
        assert!(r.read_bytes().unwrap().is_empty());
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_option_encoding() {
        let mut w = Writer::new();
        w.write_option_bytes(None)
            .write_option_bytes(Some(b"x"))
            .write_option_u64(None)
            .write_option_u64(Some(7));
        let bytes = w.into_vec();
        assert_eq!(bytes[0], 0);
        assert_eq!(&bytes[1..7], &[1, 1, 0, 0, 0, b'x']);

        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_option_bytes().unwrap(), None);
        assert_eq!(r.read_option_bytes().unwrap(), Some(&b"x"[..]));
        assert_eq!(r.read_option_u64().unwrap(), None);
        assert_eq!(r.read_option_u64().unwrap(), Some(7));
        r.finish().unwrap();
    }

    #[test]
    fn test_truncated_read_fails() {
        let mut r = Reader::new(&[1, 2, 3]);
        assert_eq!(
            r.read_u64(),
            Err(CoreError::Truncated {
                needed: 8,
                remaining: 3
            })
        );
    }

    #[test]
    fn test_truncated_blob_fails() {
        // Prefix claims 10 bytes, only 2 follow
        let mut r = Reader::new(&[10, 0, 0, 0, 1, 2]);
        assert!(matches!(
            r.read_bytes(),
            Err(CoreError::Truncated { needed: 10, remaining: 2 })
        ));
    }

    #[test]
    fn test_invalid_option_flag() {
        let mut r = Reader::new(&[2]);
        assert_eq!(r.read_option_u64(), Err(CoreError::InvalidOptionFlag(2)));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut r = Reader::new(&[2, 0, 0, 0, 0xff, 0xfe]);
        assert_eq!(r.read_string(), Err(CoreError::InvalidUtf8));
    }

    #[test]
    fn test_finish_rejects_trailing_bytes() {
        let mut r = Reader::new(&[1, 2]);
        r.read_u8().unwrap();
        assert!(r.finish().is_err());
    }

    proptest! {
        #[test]
        fn test_primitive_roundtrip(
            a in any::<u8>(),
            b in any::<u32>(),
            c in any::<u64>(),
            d in any::<u128>(),
            blob in prop::collection::vec(any::<u8>(), 0..64),
            s in ".{0,32}",
            opt in any::<Option<u64>>(),
        ) {
            let mut w = Writer::new();
            w.write_u8(a)
                .write_u32(b)
                .write_u64(c)
                .write_u128(d)
                .write_bytes(&blob)
                .write_string(&s)
                .write_option_u64(opt)
                .write_option_bytes(None);
            let bytes = w.into_vec();

            let mut r = Reader::new(&bytes);
            prop_assert_eq!(r.read_u8().unwrap(), a);
            prop_assert_eq!(r.read_u32().unwrap(), b);
            prop_assert_eq!(r.read_u64().unwrap(), c);
            prop_assert_eq!(r.read_u128().unwrap(), d);
            prop_assert_eq!(r.read_bytes().unwrap(), &blob[..]);
            prop_assert_eq!(r.read_string().unwrap(), s);
            prop_assert_eq!(r.read_option_u64().unwrap(), opt);
            prop_assert_eq!(r.read_option_bytes().unwrap(), None);
            prop_assert_eq!(r.remaining(), 0);
        }
    }
}
