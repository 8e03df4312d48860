//! The compact codec.
//!
//! Integers keep their native width (little-endian), booleans are a single
//! byte and sequences carry a variable-length prefix:
//!
//! | length range        | prefix                      |
//! |---------------------|-----------------------------|
//! | `< 2^7`             | 1 byte, `len << 1`          |
//! | `< 2^14`            | 2 bytes, `1 \| len << 2`    |
//! | `< 2^21`            | 3 bytes, `3 \| len << 3`    |
//! | `< 2^29`            | 4 bytes, `7 \| len << 3`    |

use crate::error::{EncodingError, Result};
use crate::fixed::read_exact_vec;
use crate::{MAX_SLICE_SIZE, PREALLOC_LIMIT};
use std::io::{Read, Write};

/// Types that can be written in the compact format.
pub trait CompactEncode {
    fn compact_encode<W: Write + ?Sized>(&self, w: &mut W) -> Result<()>;
}

/// Types that can be read back from the compact format.
pub trait CompactDecode: Sized {
    fn compact_decode<R: Read + ?Sized>(r: &mut R) -> Result<Self>;
}

/// Write a compact slice length prefix.
pub fn write_slice_len<W: Write + ?Sized>(w: &mut W, len: usize) -> Result<()> {
    if len < 1 << 7 {
        w.write_all(&[(len as u8) << 1])?;
    } else if len < 1 << 14 {
        let v = 1u16 | (len as u16) << 2;
        w.write_all(&v.to_le_bytes())?;
    } else if len < 1 << 21 {
        let v = 3u32 | (len as u32) << 3;
        w.write_all(&v.to_le_bytes()[..3])?;
    } else if len < 1 << 29 {
        let v = 7u32 | (len as u32) << 3;
        w.write_all(&v.to_le_bytes())?;
    } else {
        return Err(EncodingError::SliceTooLong(len));
    }
    Ok(())
}

/// Read a compact slice length prefix.
pub fn read_slice_len<R: Read + ?Sized>(r: &mut R) -> Result<usize> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b[..1])?;
    let len = if b[0] & 1 == 0 {
        (b[0] >> 1) as usize
    } else if b[0] & 3 == 1 {
        r.read_exact(&mut b[1..2])?;
        (u16::from_le_bytes([b[0], b[1]]) >> 2) as usize
    } else if b[0] & 7 == 3 {
        r.read_exact(&mut b[1..3])?;
        (u32::from_le_bytes(b) >> 3) as usize
    } else {
        r.read_exact(&mut b[1..4])?;
        (u32::from_le_bytes(b) >> 3) as usize
    };
    Ok(len)
}

fn read_bounded_len<R: Read + ?Sized>(r: &mut R, max: usize) -> Result<usize> {
    let len = read_slice_len(r)?;
    if len > max {
        return Err(EncodingError::LengthTooLarge {
            len: len as u64,
            max: max as u64,
        });
    }
    Ok(len)
}

/// Write a slice-prefixed byte string.
pub fn write_compact_bytes<W: Write + ?Sized>(w: &mut W, bytes: &[u8]) -> Result<()> {
    write_slice_len(w, bytes.len())?;
    w.write_all(bytes)?;
    Ok(())
}

/// Read a slice-prefixed byte string of at most `max` bytes.
pub fn read_compact_bytes<R: Read + ?Sized>(r: &mut R, max: usize) -> Result<Vec<u8>> {
    let len = read_bounded_len(r, max)?;
    read_exact_vec(r, len)
}

/// Encode a value into a fresh buffer.
pub fn to_compact_bytes<T: CompactEncode + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    value.compact_encode(&mut buf)?;
    Ok(buf)
}

/// Decode a value, requiring the whole input to be consumed.
pub fn from_compact_bytes<T: CompactDecode>(bytes: &[u8]) -> Result<T> {
    let mut cursor = bytes;
    let value = T::compact_decode(&mut cursor)?;
    if !cursor.is_empty() {
        return Err(EncodingError::TrailingBytes(cursor.len()));
    }
    Ok(value)
}

macro_rules! impl_compact_int {
    ($($ty:ty),+) => {
        $(
            impl CompactEncode for $ty {
                fn compact_encode<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
                    w.write_all(&self.to_le_bytes())?;
                    Ok(())
                }
            }

            impl CompactDecode for $ty {
                fn compact_decode<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
                    let mut b = [0u8; std::mem::size_of::<$ty>()];
                    r.read_exact(&mut b)?;
                    Ok(<$ty>::from_le_bytes(b))
                }
            }
        )+
    };
}

impl_compact_int!(u8, u16, u32, u64);

impl CompactEncode for bool {
    fn compact_encode<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        (*self as u8).compact_encode(w)
    }
}

impl CompactDecode for bool {
    fn compact_decode<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        match u8::compact_decode(r)? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(EncodingError::InvalidBool(b)),
        }
    }
}

impl<const N: usize> CompactEncode for [u8; N] {
    fn compact_encode<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        w.write_all(self)?;
        Ok(())
    }
}

impl<const N: usize> CompactDecode for [u8; N] {
    fn compact_decode<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let mut b = [0u8; N];
        r.read_exact(&mut b)?;
        Ok(b)
    }
}

impl<T: CompactEncode> CompactEncode for [T] {
    fn compact_encode<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        write_slice_len(w, self.len())?;
        for item in self {
            item.compact_encode(w)?;
        }
        Ok(())
    }
}

impl<T: CompactEncode> CompactEncode for Vec<T> {
    fn compact_encode<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        self.as_slice().compact_encode(w)
    }
}

impl<T: CompactDecode> CompactDecode for Vec<T> {
    fn compact_decode<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let len = read_bounded_len(r, MAX_SLICE_SIZE)?;
        let mut items = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        for _ in 0..len {
            items.push(T::compact_decode(r)?);
        }
        Ok(items)
    }
}

impl<T: CompactEncode + ?Sized> CompactEncode for &T {
    fn compact_encode<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        (**self).compact_encode(w)
    }
}
