//! The fixed-width codec.
//!
//! Integers are written little-endian at 8 bytes (`u64`), sequences carry an
//! 8-byte element count, and fixed-size arrays are written raw. This is the
//! format every consensus hash is computed over, so its byte layout is frozen.

use crate::error::{EncodingError, Result};
use crate::{MAX_SLICE_SIZE, PREALLOC_LIMIT};
use std::io::{Read, Write};

/// Types that can be written in the fixed-width format.
pub trait FixedEncode {
    fn fixed_encode<W: Write + ?Sized>(&self, w: &mut W) -> Result<()>;
}

/// Types that can be read back from the fixed-width format.
pub trait FixedDecode: Sized {
    fn fixed_decode<R: Read + ?Sized>(r: &mut R) -> Result<Self>;
}

/// Write an 8-byte little-endian length prefix.
pub fn write_prefix<W: Write + ?Sized>(w: &mut W, len: usize) -> Result<()> {
    w.write_all(&(len as u64).to_le_bytes())?;
    Ok(())
}

/// Read an 8-byte little-endian length prefix, rejecting values above `max`.
pub fn read_prefix<R: Read + ?Sized>(r: &mut R, max: usize) -> Result<usize> {
    let len = u64::fixed_decode(r)?;
    if len > max as u64 {
        return Err(EncodingError::LengthTooLarge {
            len,
            max: max as u64,
        });
    }
    Ok(len as usize)
}

/// Write a length-prefixed byte string.
pub fn write_fixed_bytes<W: Write + ?Sized>(w: &mut W, bytes: &[u8]) -> Result<()> {
    write_prefix(w, bytes.len())?;
    w.write_all(bytes)?;
    Ok(())
}

/// Read a length-prefixed byte string of at most `max` bytes.
pub fn read_fixed_bytes<R: Read + ?Sized>(r: &mut R, max: usize) -> Result<Vec<u8>> {
    let len = read_prefix(r, max)?;
    read_exact_vec(r, len)
}

/// Encode a value into a fresh buffer.
pub fn to_fixed_bytes<T: FixedEncode + ?Sized>(value: &T) -> Vec<u8> {
    let mut buf = Vec::new();
    value
        .fixed_encode(&mut buf)
        .expect("fixed encoding into memory should not fail");
    buf
}

/// Decode a value, requiring the whole input to be consumed.
pub fn from_fixed_bytes<T: FixedDecode>(bytes: &[u8]) -> Result<T> {
    let mut cursor = bytes;
    let value = T::fixed_decode(&mut cursor)?;
    if !cursor.is_empty() {
        return Err(EncodingError::TrailingBytes(cursor.len()));
    }
    Ok(value)
}

/// Size of a value in the fixed-width format.
pub fn fixed_size<T: FixedEncode + ?Sized>(value: &T) -> usize {
    to_fixed_bytes(value).len()
}

pub(crate) fn read_exact_vec<R: Read + ?Sized>(r: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(len.min(PREALLOC_LIMIT));
    (&mut *r).take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(EncodingError::UnexpectedEof);
    }
    Ok(buf)
}

impl FixedEncode for u8 {
    fn fixed_encode<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        w.write_all(&[*self])?;
        Ok(())
    }
}

impl FixedDecode for u8 {
    fn fixed_decode<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let mut b = [0u8; 1];
        r.read_exact(&mut b)?;
        Ok(b[0])
    }
}

impl FixedEncode for bool {
    fn fixed_encode<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        (*self as u8).fixed_encode(w)
    }
}

impl FixedDecode for bool {
    fn fixed_decode<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        match u8::fixed_decode(r)? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(EncodingError::InvalidBool(b)),
        }
    }
}

impl FixedEncode for u64 {
    fn fixed_encode<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        w.write_all(&self.to_le_bytes())?;
        Ok(())
    }
}

impl FixedDecode for u64 {
    fn fixed_decode<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let mut b = [0u8; 8];
        r.read_exact(&mut b)?;
        Ok(u64::from_le_bytes(b))
    }
}

// Narrower integers are widened to 8 bytes, as every integer is in this format.
macro_rules! impl_fixed_widened {
    ($($ty:ty),+) => {
        $(
            impl FixedEncode for $ty {
                fn fixed_encode<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
                    (*self as u64).fixed_encode(w)
                }
            }

            impl FixedDecode for $ty {
                fn fixed_decode<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
                    let v = u64::fixed_decode(r)?;
                    <$ty>::try_from(v).map_err(|_| {
                        EncodingError::invalid(format!(
                            "{} does not fit in {}",
                            v,
                            stringify!($ty)
                        ))
                    })
                }
            }
        )+
    };
}

impl_fixed_widened!(u16, u32);

impl<const N: usize> FixedEncode for [u8; N] {
    fn fixed_encode<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        w.write_all(self)?;
        Ok(())
    }
}

impl<const N: usize> FixedDecode for [u8; N] {
    fn fixed_decode<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let mut b = [0u8; N];
        r.read_exact(&mut b)?;
        Ok(b)
    }
}

impl<T: FixedEncode> FixedEncode for [T] {
    fn fixed_encode<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        write_prefix(w, self.len())?;
        for item in self {
            item.fixed_encode(w)?;
        }
        Ok(())
    }
}

impl<T: FixedEncode> FixedEncode for Vec<T> {
    fn fixed_encode<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        self.as_slice().fixed_encode(w)
    }
}

impl<T: FixedDecode> FixedDecode for Vec<T> {
    fn fixed_decode<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let len = read_prefix(r, MAX_SLICE_SIZE)?;
        let mut items = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        for _ in 0..len {
            items.push(T::fixed_decode(r)?);
        }
        Ok(items)
    }
}

impl<T: FixedEncode + ?Sized> FixedEncode for &T {
    fn fixed_encode<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        (**self).fixed_encode(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u64_little_endian() {
        assert_eq!(to_fixed_bytes(&1u64), vec![1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(
            to_fixed_bytes(&0x0102_0304_0506_0708u64),
            vec![8, 7, 6, 5, 4, 3, 2, 1]
        );
    }

    #[test]
    fn test_narrow_integers_are_widened() {
        assert_eq!(to_fixed_bytes(&7u32), to_fixed_bytes(&7u64));
        assert_eq!(to_fixed_bytes(&7u16).len(), 8);
    }

    #[test]
    fn test_widened_integer_overflow() {
        let bytes = to_fixed_bytes(&(u32::MAX as u64 + 1));
        assert!(matches!(
            from_fixed_bytes::<u32>(&bytes),
            Err(EncodingError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_bytes_are_length_prefixed() {
        let mut buf = Vec::new();
        write_fixed_bytes(&mut buf, b"abc").unwrap();
        assert_eq!(buf, hex::decode("0300000000000000616263").unwrap());
        // a Vec<u8> encodes to the same bytes
        assert_eq!(to_fixed_bytes(&b"abc".to_vec()), buf);
    }

    #[test]
    fn test_array_is_raw() {
        assert_eq!(to_fixed_bytes(&[9u8; 4]), vec![9, 9, 9, 9]);
    }

    #[test]
    fn test_truncated_input() {
        let result = from_fixed_bytes::<u64>(&[1, 2, 3]);
        assert!(matches!(result, Err(EncodingError::UnexpectedEof)));

        let mut cursor: &[u8] = &hex::decode("0500000000000000aabb").unwrap();
        let result = read_fixed_bytes(&mut cursor, 16);
        assert!(matches!(result, Err(EncodingError::UnexpectedEof)));
    }

    #[test]
    fn test_prefix_bound() {
        let mut cursor: &[u8] = &to_fixed_bytes(&300u64);
        let result = read_prefix(&mut cursor, 256);
        assert!(matches!(
            result,
            Err(EncodingError::LengthTooLarge { len: 300, max: 256 })
        ));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let result = from_fixed_bytes::<u8>(&[1, 2]);
        assert!(matches!(result, Err(EncodingError::TrailingBytes(1))));
    }

    #[test]
    fn test_invalid_bool() {
        assert!(from_fixed_bytes::<bool>(&[1]).unwrap());
        assert!(matches!(
            from_fixed_bytes::<bool>(&[2]),
            Err(EncodingError::InvalidBool(2))
        ));
    }

    #[test]
    fn test_vec_of_u64() {
        let values = vec![1u64, 2, 3];
        let bytes = to_fixed_bytes(&values);
        assert_eq!(bytes.len(), 8 + 3 * 8);
        let decoded: Vec<u64> = from_fixed_bytes(&bytes).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_hostile_vec_length() {
        let bytes = to_fixed_bytes(&u64::MAX);
        assert!(matches!(
            from_fixed_bytes::<Vec<u64>>(&bytes),
            Err(EncodingError::LengthTooLarge { .. })
        ));
    }
}
