//! Unlock hashes: the addresses outputs are locked to.

use crate::crypto::PublicKey;
use crate::hash::{hash_concat, hash_object, Hash, HASH_SIZE};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use stakechain_encoding::{impl_encoding, to_fixed_bytes};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of checksum bytes appended to the string form.
pub const UNLOCK_HASH_CHECKSUM_SIZE: usize = 6;

/// Length of the hex string form: type, hash and checksum.
pub const UNLOCK_HASH_STRING_LEN: usize = (1 + HASH_SIZE + UNLOCK_HASH_CHECKSUM_SIZE) * 2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnlockHashError {
    #[error("marshalled unlock hash is the wrong length")]
    WrongLength,
    #[error("provided unlock hash has an invalid checksum")]
    InvalidChecksum,
    #[error("invalid unlock hash hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// The kind of condition an unlock hash commits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct UnlockType(pub u8);

impl UnlockType {
    pub const NIL: Self = Self(0);
    pub const PUBLIC_KEY: Self = Self(1);
    pub const ATOMIC_SWAP: Self = Self(2);
    pub const MULTI_SIG: Self = Self(3);
}

impl_encoding!(UnlockType, 0);

impl fmt::Display for UnlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tagged hash committing to an unlock condition.
///
/// Ordering is by type first, then by hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct UnlockHash {
    pub unlock_type: UnlockType,
    pub hash: Hash,
}

impl_encoding!(UnlockHash, unlock_type, hash);

impl UnlockHash {
    pub const NIL: Self = Self {
        unlock_type: UnlockType::NIL,
        hash: Hash::ZERO,
    };

    pub fn new(unlock_type: UnlockType, hash: Hash) -> Self {
        Self { unlock_type, hash }
    }

    /// The unlock hash owned by a single public key.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self::new(UnlockType::PUBLIC_KEY, hash_object(&to_fixed_bytes(public_key)))
    }

    pub fn is_nil(&self) -> bool {
        *self == Self::NIL
    }

    fn checksum(&self) -> [u8; UNLOCK_HASH_CHECKSUM_SIZE] {
        let h = hash_concat(&[&[self.unlock_type.0], self.hash.as_ref()]);
        let mut out = [0u8; UNLOCK_HASH_CHECKSUM_SIZE];
        out.copy_from_slice(&h.0[..UNLOCK_HASH_CHECKSUM_SIZE]);
        out
    }
}

impl fmt::Display for UnlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            return Ok(());
        }
        write!(
            f,
            "{:02x}{}{}",
            self.unlock_type.0,
            self.hash.to_hex(),
            hex::encode(self.checksum())
        )
    }
}

impl fmt::Debug for UnlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnlockHash({})", self)
    }
}

impl FromStr for UnlockHash {
    type Err = UnlockHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::NIL);
        }
        if s.len() != UNLOCK_HASH_STRING_LEN {
            return Err(UnlockHashError::WrongLength);
        }
        let bytes = hex::decode(s)?;
        let mut hash = [0u8; HASH_SIZE];
        hash.copy_from_slice(&bytes[1..1 + HASH_SIZE]);
        let uh = Self::new(UnlockType(bytes[0]), Hash(hash));
        if uh.checksum()[..] != bytes[1 + HASH_SIZE..] {
            return Err(UnlockHashError::InvalidChecksum);
        }
        Ok(uh)
    }
}

impl Serialize for UnlockHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for UnlockHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
