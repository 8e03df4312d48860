//! Codec selection for types whose layout is the same in both formats.
//!
//! Tagged unions and versioned containers nest one encoding inside another
//! (a payload written to a buffer, then prefixed). Writing that logic once,
//! generic over [`Codec`], keeps the fixed and compact renditions in lockstep.

use crate::compact::{read_compact_bytes, write_compact_bytes, CompactDecode, CompactEncode};
use crate::error::{EncodingError, Result};
use crate::fixed::{read_fixed_bytes, write_fixed_bytes, FixedDecode, FixedEncode};
use std::io::{Read, Write};

/// One of the two binary formats.
pub trait Codec {
    const NAME: &'static str;

    fn encode<T, W>(value: &T, w: &mut W) -> Result<()>
    where
        T: FixedEncode + CompactEncode + ?Sized,
        W: Write + ?Sized;

    fn decode<T, R>(r: &mut R) -> Result<T>
    where
        T: FixedDecode + CompactDecode,
        R: Read + ?Sized;

    /// Write a byte string with this format's length prefix.
    fn write_bytes<W: Write + ?Sized>(w: &mut W, bytes: &[u8]) -> Result<()>;

    /// Read a byte string with this format's length prefix.
    fn read_bytes<R: Read + ?Sized>(r: &mut R, max: usize) -> Result<Vec<u8>>;

    fn to_bytes<T>(value: &T) -> Result<Vec<u8>>
    where
        T: FixedEncode + CompactEncode + ?Sized,
    {
        let mut buf = Vec::new();
        Self::encode(value, &mut buf)?;
        Ok(buf)
    }

    /// Decode a value, requiring the whole input to be consumed.
    fn from_bytes<T>(bytes: &[u8]) -> Result<T>
    where
        T: FixedDecode + CompactDecode,
    {
        let mut cursor = bytes;
        let value = Self::decode(&mut cursor)?;
        if !cursor.is_empty() {
            return Err(EncodingError::TrailingBytes(cursor.len()));
        }
        Ok(value)
    }
}

/// The fixed-width format.
#[derive(Debug, Clone, Copy)]
pub struct Fixed;

/// The compact format.
#[derive(Debug, Clone, Copy)]
pub struct Compact;

impl Codec for Fixed {
    const NAME: &'static str = "fixed";

    fn encode<T, W>(value: &T, w: &mut W) -> Result<()>
    where
        T: FixedEncode + CompactEncode + ?Sized,
        W: Write + ?Sized,
    {
        value.fixed_encode(w)
    }

    fn decode<T, R>(r: &mut R) -> Result<T>
    where
        T: FixedDecode + CompactDecode,
        R: Read + ?Sized,
    {
        T::fixed_decode(r)
    }

    fn write_bytes<W: Write + ?Sized>(w: &mut W, bytes: &[u8]) -> Result<()> {
        write_fixed_bytes(w, bytes)
    }

    fn read_bytes<R: Read + ?Sized>(r: &mut R, max: usize) -> Result<Vec<u8>> {
        read_fixed_bytes(r, max)
    }
}

impl Codec for Compact {
    const NAME: &'static str = "compact";

    fn encode<T, W>(value: &T, w: &mut W) -> Result<()>
    where
        T: FixedEncode + CompactEncode + ?Sized,
        W: Write + ?Sized,
    {
        value.compact_encode(w)
    }

    fn decode<T, R>(r: &mut R) -> Result<T>
    where
        T: FixedDecode + CompactDecode,
        R: Read + ?Sized,
    {
        T::compact_decode(r)
    }

    fn write_bytes<W: Write + ?Sized>(w: &mut W, bytes: &[u8]) -> Result<()> {
        write_compact_bytes(w, bytes)
    }

    fn read_bytes<R: Read + ?Sized>(r: &mut R, max: usize) -> Result<Vec<u8>> {
        read_compact_bytes(r, max)
    }
}
