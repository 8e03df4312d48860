//! Block stake difficulty.

use crate::currency::define_amount;

define_amount!(
    /// Number of active block stakes multiplied by the block frequency.
    ///
    /// A higher difficulty means a lower target and so fewer winning stakes
    /// per second.
    Difficulty,
    "difficulty"
);

impl Difficulty {
    pub fn div64(&self, y: u64) -> Difficulty {
        if y == 0 {
            crate::invariant::critical("difficulty division by zero");
        }
        Difficulty(&self.0 / y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use stakechain_encoding::{from_compact_bytes, from_fixed_bytes, to_compact_bytes, to_fixed_bytes};

    #[test]
    fn test_div64() {
        assert_eq!(Difficulty::from(100).div64(7), Difficulty::from(14));
    }

    #[test]
    fn test_codecs() {
        let d = Difficulty::from(600_000_000);
        assert_eq!(from_fixed_bytes::<Difficulty>(&to_fixed_bytes(&d)).unwrap(), d);
        assert_eq!(
            from_compact_bytes::<Difficulty>(&to_compact_bytes(&d).unwrap()).unwrap(),
            d
        );
    }

    #[test]
    fn test_json_negative_rejected() {
        assert!(serde_json::from_str::<Difficulty>("\"-1\"").is_err());
        assert_eq!(
            serde_json::from_str::<Difficulty>("\"42\"").unwrap(),
            Difficulty::from(42)
        );
    }

    #[test]
    #[should_panic(expected = "negative difficulty")]
    fn test_negative_bigint_is_fatal() {
        let _ = Difficulty::from_bigint(&BigInt::from(-1));
    }
}
