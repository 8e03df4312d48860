//! Block stake targets and their relation to difficulty.
//!
//! A target is a 256-bit big-endian ceiling. Difficulty is its inverse
//! relative to the chain's root depth: `difficulty = root_depth / target`.
//! The rational helpers below work on the closed forms of the inverses so
//! only integer arithmetic is needed.

use crate::difficulty::Difficulty;
use crate::invariant;
use num_bigint::{BigInt, BigUint, Sign};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use stakechain_encoding::impl_encoding;
use std::cmp::Ordering;
use std::fmt;

/// Size of a target, in bytes.
pub const TARGET_SIZE: usize = 32;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Target(pub [u8; TARGET_SIZE]);

impl Target {
    /// The largest possible target, used as root depth by every network.
    pub const MAX: Self = Self([0xff; TARGET_SIZE]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; TARGET_SIZE]
    }

    pub fn to_big(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    /// Convert an integer to a target.
    ///
    /// Values wider than 256 bits saturate to `root_depth`. Negative values
    /// are a severe invariant violation and yield the zero target.
    pub fn from_int(value: &BigInt, root_depth: &Target) -> Target {
        if value.sign() == Sign::Minus {
            invariant::severe("negative value used when converting to target");
            return Target::default();
        }
        Self::from_uint(value.magnitude(), root_depth)
    }

    pub fn from_uint(value: &BigUint, root_depth: &Target) -> Target {
        if value.bits() > (TARGET_SIZE * 8) as u64 {
            return *root_depth;
        }
        let mut t = Target::default();
        if value.bits() == 0 {
            return t;
        }
        let bytes = value.to_bytes_be();
        t.0[TARGET_SIZE - bytes.len()..].copy_from_slice(&bytes);
        t
    }

    /// Convert the truncated rational `num / den` to a target.
    pub fn from_rational(num: &BigInt, den: &BigInt, root_depth: &Target) -> Target {
        if den.sign() == Sign::NoSign {
            invariant::critical("target rational with a zero denominator");
        }
        let negative = num.sign() != Sign::NoSign
            && (num.sign() == Sign::Minus) != (den.sign() == Sign::Minus);
        if negative {
            invariant::severe("negative value used when converting to target");
            return Target::default();
        }
        Self::from_uint(&(num.magnitude() / den.magnitude()), root_depth)
    }

    /// The target matching a difficulty: `root_depth / difficulty`.
    pub fn from_difficulty(difficulty: &Difficulty, root_depth: &Target) -> Target {
        if difficulty.is_zero() {
            invariant::critical("target requested for a zero difficulty");
        }
        Self::from_uint(&(root_depth.to_big() / difficulty.big()), root_depth)
    }

    /// The difficulty of this target; the zero target has the maximal difficulty.
    pub fn difficulty(&self, root_depth: &Target) -> Difficulty {
        if self.is_zero() {
            return Difficulty::from_big(root_depth.to_big());
        }
        Difficulty::from_big(root_depth.to_big() / self.to_big())
    }

    /// Target whose difficulty is the sum of both difficulties: `x·y / (x+y)`.
    pub fn add_difficulties(&self, other: &Target, root_depth: &Target) -> Target {
        let (x, y) = (self.to_big(), other.to_big());
        let sum = &x + &y;
        if sum.bits() == 0 {
            return Target::default();
        }
        Self::from_uint(&(x * y / sum), root_depth)
    }

    /// Target whose difficulty is `difficulty(self) - difficulty(other)`:
    /// `x·y / (y-x)`.
    ///
    /// A negative result is severe; equal targets leave no difficulty and
    /// are critical.
    pub fn subtract_difficulties(&self, other: &Target, root_depth: &Target) -> Target {
        let (x, y) = (self.to_big(), other.to_big());
        match y.cmp(&x) {
            Ordering::Equal => invariant::critical("subtracting equal difficulties"),
            Ordering::Less => {
                invariant::severe("negative value used when converting to target");
                Target::default()
            }
            Ordering::Greater => {
                let diff = &y - &x;
                Self::from_uint(&(x * y / diff), root_depth)
            }
        }
    }

    /// Target whose difficulty is `difficulty(self) * num / den`:
    /// `den·x / num`.
    pub fn mul_difficulty(&self, num: u64, den: u64, root_depth: &Target) -> Target {
        if num == 0 {
            invariant::critical("multiplying a difficulty by zero");
        }
        Self::from_uint(&(self.to_big() * den / num), root_depth)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut out = [0u8; TARGET_SIZE];
        hex::decode_to_slice(s, &mut out)?;
        Ok(Self(out))
    }
}

impl PartialOrd for Target {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Big-endian bytes compare the same way as the integers they encode.
impl Ord for Target {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target({})", self.to_hex())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl_encoding!(Target, 0);

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Target::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakechain_encoding::{from_fixed_bytes, to_compact_bytes, to_fixed_bytes};

    fn target(n: u64) -> Target {
        Target::from_uint(&BigUint::from(n), &Target::MAX)
    }

    #[test]
    fn test_from_uint_right_aligned() {
        let t = target(0x0102);
        assert_eq!(t.0[30], 0x01);
        assert_eq!(t.0[31], 0x02);
        assert!(t.0[..30].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_overflow_saturates_to_root_depth() {
        let root = target(1000);
        let huge = BigUint::from(1u8) << 300;
        assert_eq!(Target::from_uint(&huge, &root), root);
    }

    #[test]
    fn test_zero_target_has_root_difficulty() {
        let d = Target::default().difficulty(&Target::MAX);
        assert_eq!(d.big(), &Target::MAX.to_big());
    }

    #[test]
    fn test_difficulty_inverse_law() {
        let root = Target::MAX;
        for n in [1u64, 7, 1_000, 123_456_789, u64::MAX] {
            let t = Target::from_uint(&(root.to_big() / n), &root);
            let back = Target::from_difficulty(&t.difficulty(&root), &root);
            assert_eq!(back, t, "divisor {}", n);
        }
        // truncation can only round the recovered target up
        let t = target(3);
        assert!(Target::from_difficulty(&t.difficulty(&root), &root) >= t);
    }

    #[test]
    fn test_add_difficulties() {
        // difficulties root/200 and root/300 add to root/120
        let x = target(200);
        let y = target(300);
        assert_eq!(x.add_difficulties(&y, &Target::MAX), target(120));
    }

    #[test]
    fn test_subtract_difficulties() {
        let x = target(120);
        let y = target(300);
        assert_eq!(x.subtract_difficulties(&y, &Target::MAX), target(200));
    }

    #[test]
    #[should_panic(expected = "equal difficulties")]
    fn test_subtract_equal_is_fatal() {
        let x = target(5);
        x.subtract_difficulties(&x, &Target::MAX);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "negative value")]
    fn test_negative_int_is_severe() {
        Target::from_int(&BigInt::from(-3), &Target::MAX);
    }

    #[test]
    fn test_mul_difficulty() {
        // doubling the difficulty halves the target
        assert_eq!(target(1000).mul_difficulty(2, 1, &Target::MAX), target(500));
        assert_eq!(target(1000).mul_difficulty(10, 25, &Target::MAX), target(2500));
    }

    #[test]
    fn test_from_rational() {
        let t = Target::from_rational(&BigInt::from(10), &BigInt::from(3), &Target::MAX);
        assert_eq!(t, target(3));
    }

    #[test]
    fn test_encodes_raw_32_bytes() {
        let t = target(42);
        assert_eq!(to_fixed_bytes(&t), t.0.to_vec());
        assert_eq!(to_compact_bytes(&t).unwrap(), t.0.to_vec());
        assert_eq!(from_fixed_bytes::<Target>(&t.0).unwrap(), t);
    }

    #[test]
    fn test_json_hex() {
        let t = target(1);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(serde_json::from_str::<Target>(&json).unwrap(), t);
    }

    #[test]
    fn test_ordering_matches_integers() {
        assert!(target(255) < target(256));
    }
}
