//! Blake2b hashing utilities for the blockchain.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use stakechain_encoding::{
    impl_encoding, to_fixed_bytes, CompactDecode, CompactEncode, FixedDecode, FixedEncode,
};
use std::fmt;

/// Size of every hash, in bytes.
pub const HASH_SIZE: usize = 32;

/// A named alias for a 32-byte(u8) array, used to represent a 256-bit hash.
pub type H256 = [u8; HASH_SIZE];

/// A wrapper type for H256 with hex Display and Debug formatting.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Hash(pub H256);

impl Hash {
    /// The zero hash (all zeros).
    pub const ZERO: Self = Self([0u8; HASH_SIZE]);

    /// Create a new Hash from raw bytes.
    pub fn from_bytes(bytes: H256) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &H256 {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_SIZE]
    }

    /// Convert to a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != HASH_SIZE {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; HASH_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", &self.to_hex()[..8])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<H256> for Hash {
    fn from(bytes: H256) -> Self {
        Self(bytes)
    }
}

impl From<Hash> for H256 {
    fn from(hash: Hash) -> Self {
        hash.0
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl_encoding!(Hash, 0);

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

fn hasher() -> blake2b_simd::State {
    blake2b_simd::Params::new().hash_length(HASH_SIZE).to_state()
}

fn finalize(state: &blake2b_simd::State) -> Hash {
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(state.finalize().as_bytes());
    Hash(out)
}

/// Hash arbitrary data using Blake2b-256.
pub fn hash(data: &[u8]) -> Hash {
    let mut state = hasher();
    state.update(data);
    finalize(&state)
}

/// Hash multiple pieces of data by concatenating them.
pub fn hash_concat(parts: &[&[u8]]) -> Hash {
    let mut state = hasher();
    for part in parts {
        state.update(part);
    }
    finalize(&state)
}

/// Hash the fixed encoding of an object.
///
/// Byte vectors are hashed together with their 8-byte length prefix.
pub fn hash_object<T: FixedEncode + ?Sized>(object: &T) -> Hash {
    hash(&to_fixed_bytes(object))
}

/// Streams fixed encodings straight into a Blake2b state.
///
/// Used for signature hashes, which are built from many separately
/// encoded pieces.
pub struct ObjectHasher {
    state: blake2b_simd::State,
}

impl ObjectHasher {
    pub fn new() -> Self {
        Self { state: hasher() }
    }

    /// Append the fixed encoding of `object`.
    pub fn write<T: FixedEncode + ?Sized>(&mut self, object: &T) -> &mut Self {
        object
            .fixed_encode(&mut self.state)
            .expect("writing into a hash state should not fail");
        self
    }

    pub fn finish(&self) -> Hash {
        finalize(&self.state)
    }
}

impl Default for ObjectHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakechain_encoding::from_compact_bytes;

    #[test]
    fn test_hash_deterministic() {
        let data = b"hello world";
        assert_eq!(hash(data), hash(data));
    }

    #[test]
    fn test_hash_different_inputs() {
        assert_ne!(hash(b"hello"), hash(b"world"));
    }

    #[test]
    fn test_blake2b_known_answer() {
        assert_eq!(
            hash(b"").to_hex(),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
    }

    #[test]
    fn test_hash_hex_roundtrip() {
        let h = hash(b"test data");
        let parsed = Hash::from_hex(&h.to_hex()).unwrap();
        assert_eq!(h, parsed);
        assert!(Hash::from_hex("abcd").is_err());
    }

    #[test]
    fn test_hash_display() {
        let display = format!("{}", hash(b"test"));
        assert_eq!(display.len(), 64);
    }

    #[test]
    fn test_hash_concat() {
        assert_eq!(hash_concat(&[b"hello", b"world"]), hash(b"helloworld"));
    }

    #[test]
    fn test_hash_object_includes_prefix() {
        let data = b"abc".to_vec();
        let mut prefixed = 3u64.to_le_bytes().to_vec();
        prefixed.extend_from_slice(b"abc");
        assert_eq!(hash_object(&data), hash(&prefixed));
    }

    #[test]
    fn test_object_hasher_matches_hash_object() {
        let mut hasher = ObjectHasher::new();
        hasher.write(&7u64).write(&b"xyz".to_vec());
        let mut expected = to_fixed_bytes(&7u64);
        expected.extend(to_fixed_bytes(&b"xyz".to_vec()));
        assert_eq!(hasher.finish(), hash(&expected));
    }

    #[test]
    fn test_hash_encodes_raw() {
        let h = hash(b"raw");
        assert_eq!(to_fixed_bytes(&h), h.0.to_vec());
        assert_eq!(from_compact_bytes::<Hash>(&h.0).unwrap(), h);
    }

    #[test]
    fn test_hash_json_is_hex() {
        let h = hash(b"json");
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{}\"", h.to_hex()));
        assert_eq!(serde_json::from_str::<Hash>(&json).unwrap(), h);
    }

    #[test]
    fn test_zero_hash() {
        assert_eq!(Hash::ZERO.0, [0u8; 32]);
        assert!(Hash::ZERO.is_zero());
    }
}
