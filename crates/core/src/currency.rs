//! Arbitrary-precision, non-negative amounts.
//!
//! [`Currency`] and [`Difficulty`](crate::difficulty::Difficulty) share the
//! same representation: an unsigned big integer, written on the wire as a
//! length-prefixed big-endian magnitude of at most 256 bytes and in JSON as
//! a quoted decimal string.

use crate::invariant;
use num_bigint::{BigInt, BigUint};
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Sub};
use thiserror::Error;

/// Largest magnitude, in bytes, accepted when decoding an amount.
pub const MAX_AMOUNT_BYTES: usize = 256;

/// Errors that can occur when parsing amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    #[error("negative {0} not allowed")]
    Negative(&'static str),
    #[error("invalid {kind} value {value:?}")]
    Invalid { kind: &'static str, value: String },
}

macro_rules! define_amount {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
        pub struct $name(num_bigint::BigUint);

        impl $name {
            pub fn zero() -> Self {
                Self::default()
            }

            pub fn from_big(value: num_bigint::BigUint) -> Self {
                Self(value)
            }

            /// Convert a signed integer; a negative value is a critical error.
            pub fn from_bigint(value: &num_bigint::BigInt) -> Self {
                match value.to_biguint() {
                    Some(v) => Self(v),
                    None => $crate::invariant::critical(concat!("negative ", $kind, " not allowed")),
                }
            }

            pub fn big(&self) -> &num_bigint::BigUint {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0.bits() == 0
            }

            pub fn to_u64(&self) -> Option<u64> {
                u64::try_from(&self.0).ok()
            }

            /// Big-endian magnitude; empty for zero.
            pub fn to_bytes_be(&self) -> Vec<u8> {
                if self.is_zero() {
                    Vec::new()
                } else {
                    self.0.to_bytes_be()
                }
            }

            pub fn from_bytes_be(bytes: &[u8]) -> Self {
                Self(num_bigint::BigUint::from_bytes_be(bytes))
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(num_bigint::BigUint::from(value))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::currency::CurrencyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.starts_with('-') {
                    return Err($crate::currency::CurrencyError::Negative($kind));
                }
                s.parse::<num_bigint::BigUint>().map(Self).map_err(|_| {
                    $crate::currency::CurrencyError::Invalid {
                        kind: $kind,
                        value: s.to_string(),
                    }
                })
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0.to_string())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }

        impl stakechain_encoding::FixedEncode for $name {
            fn fixed_encode<W: std::io::Write + ?Sized>(
                &self,
                w: &mut W,
            ) -> stakechain_encoding::Result<()> {
                stakechain_encoding::write_fixed_bytes(w, &self.to_bytes_be())
            }
        }

        impl stakechain_encoding::FixedDecode for $name {
            fn fixed_decode<R: std::io::Read + ?Sized>(r: &mut R) -> stakechain_encoding::Result<Self> {
                let bytes = stakechain_encoding::read_fixed_bytes(r, $crate::currency::MAX_AMOUNT_BYTES)?;
                Ok(Self::from_bytes_be(&bytes))
            }
        }

        impl stakechain_encoding::CompactEncode for $name {
            fn compact_encode<W: std::io::Write + ?Sized>(
                &self,
                w: &mut W,
            ) -> stakechain_encoding::Result<()> {
                stakechain_encoding::write_compact_bytes(w, &self.to_bytes_be())
            }
        }

        impl stakechain_encoding::CompactDecode for $name {
            fn compact_decode<R: std::io::Read + ?Sized>(r: &mut R) -> stakechain_encoding::Result<Self> {
                let bytes =
                    stakechain_encoding::read_compact_bytes(r, $crate::currency::MAX_AMOUNT_BYTES)?;
                Ok(Self::from_bytes_be(&bytes))
            }
        }
    };
}

pub(crate) use define_amount;

define_amount!(
    /// An amount of coins (or block stakes) in base units.
    Currency,
    "currency"
);

impl Currency {
    /// Subtract, returning `None` instead of going negative.
    pub fn checked_sub(&self, other: &Currency) -> Option<Currency> {
        if other.0 > self.0 {
            None
        } else {
            Some(Currency(&self.0 - &other.0))
        }
    }

    /// Multiply by a rational `num/den`, truncating.
    pub fn mul_ratio(&self, num: u64, den: u64) -> Currency {
        if den == 0 {
            invariant::critical("currency ratio with a zero denominator");
        }
        Currency(&self.0 * num / den)
    }

    pub fn to_bigint(&self) -> BigInt {
        BigInt::from(self.0.clone())
    }
}

impl Add for Currency {
    type Output = Currency;

    fn add(self, rhs: Currency) -> Currency {
        Currency(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Currency> for &'a Currency {
    type Output = Currency;

    fn add(self, rhs: &'a Currency) -> Currency {
        Currency(&self.0 + &rhs.0)
    }
}

impl<'a> Sub<&'a Currency> for &'a Currency {
    type Output = Currency;

    /// Panics when the result would be negative.
    fn sub(self, rhs: &'a Currency) -> Currency {
        match self.checked_sub(rhs) {
            Some(c) => c,
            None => invariant::critical("negative currency not allowed"),
        }
    }
}

impl Sub for Currency {
    type Output = Currency;

    fn sub(self, rhs: Currency) -> Currency {
        &self - &rhs
    }
}

impl Mul<u64> for &Currency {
    type Output = Currency;

    fn mul(self, rhs: u64) -> Currency {
        Currency(&self.0 * rhs)
    }
}

impl Mul<u64> for Currency {
    type Output = Currency;

    fn mul(self, rhs: u64) -> Currency {
        &self * rhs
    }
}

impl Div<u64> for &Currency {
    type Output = Currency;

    fn div(self, rhs: u64) -> Currency {
        if rhs == 0 {
            invariant::critical("currency division by zero");
        }
        Currency(&self.0 / rhs)
    }
}

impl<'a> Sum<&'a Currency> for Currency {
    fn sum<I: Iterator<Item = &'a Currency>>(iter: I) -> Currency {
        Currency(iter.fold(BigUint::default(), |acc, c| acc + &c.0))
    }
}

impl Sum for Currency {
    fn sum<I: Iterator<Item = Currency>>(iter: I) -> Currency {
        Currency(iter.fold(BigUint::default(), |acc, c| acc + c.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakechain_encoding::{from_compact_bytes, from_fixed_bytes, to_compact_bytes, to_fixed_bytes};

    #[test]
    fn test_arithmetic() {
        let a = Currency::from(30);
        let b = Currency::from(12);
        assert_eq!(&a + &b, Currency::from(42));
        assert_eq!(&a - &b, Currency::from(18));
        assert_eq!(&a * 3, Currency::from(90));
        assert_eq!(&a / 4, Currency::from(7));
        assert_eq!(a.mul_ratio(2, 3), Currency::from(20));
        assert_eq!(b.checked_sub(&a), None);
    }

    #[test]
    #[should_panic(expected = "negative currency")]
    fn test_sub_underflow_is_fatal() {
        let _ = &Currency::from(1) - &Currency::from(2);
    }

    #[test]
    fn test_sum() {
        let fees = vec![Currency::from(1), Currency::from(2), Currency::from(3)];
        assert_eq!(fees.iter().sum::<Currency>(), Currency::from(6));
        assert_eq!(Vec::<Currency>::new().iter().sum::<Currency>(), Currency::zero());
    }

    #[test]
    fn test_zero_encodes_empty() {
        assert_eq!(to_fixed_bytes(&Currency::zero()), vec![0u8; 8]);
        assert_eq!(to_compact_bytes(&Currency::zero()).unwrap(), vec![0u8]);
    }

    #[test]
    fn test_fixed_layout() {
        let bytes = to_fixed_bytes(&Currency::from(1_000_000_000));
        assert_eq!(hex::encode(&bytes), "04000000000000003b9aca00");
        assert_eq!(
            from_fixed_bytes::<Currency>(&bytes).unwrap(),
            Currency::from(1_000_000_000)
        );
    }

    #[test]
    fn test_compact_layout() {
        let bytes = to_compact_bytes(&Currency::from(1_000_000_000)).unwrap();
        assert_eq!(hex::encode(&bytes), "083b9aca00");
        assert_eq!(
            from_compact_bytes::<Currency>(&bytes).unwrap(),
            Currency::from(1_000_000_000)
        );
    }

    #[test]
    fn test_magnitude_bound() {
        let mut bytes = to_fixed_bytes(&257u64);
        bytes.extend(vec![1u8; 257]);
        assert!(from_fixed_bytes::<Currency>(&bytes).is_err());
    }

    #[test]
    fn test_json_decimal_string() {
        let c = Currency::from(685_228_263_400_000_000);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"685228263400000000\"");
        assert_eq!(serde_json::from_str::<Currency>(&json).unwrap(), c);
    }

    #[test]
    fn test_json_negative_rejected() {
        let err = "-5".parse::<Currency>().unwrap_err();
        assert_eq!(err, CurrencyError::Negative("currency"));
        assert!(serde_json::from_str::<Currency>("\"-5\"").is_err());
        assert!(serde_json::from_str::<Currency>("\"12a\"").is_err());
    }

    #[test]
    fn test_to_u64() {
        assert_eq!(Currency::from(7).to_u64(), Some(7));
        let big = &Currency::from(u64::MAX) + &Currency::from(1);
        assert_eq!(big.to_u64(), None);
    }
}
