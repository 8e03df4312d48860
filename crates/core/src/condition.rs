//! Unlock conditions: the spending rules attached to outputs.
//!
//! Every condition travels inside the same envelope: a one-byte type tag
//! followed by the length-prefixed variant payload. In JSON the envelope is
//! `{"type": n, "data": {...}}`, and the nil condition is just `{}`.

use crate::block::Timestamp;
use crate::fulfillment::{FulfillmentError, UnlockFulfillment};
use crate::hash::{hash_object, HASH_SIZE};
use crate::merkle::MerkleTree;
use crate::signing::{FulfillContext, FulfillableContext};
use crate::unlockhash::{UnlockHash, UnlockType};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::de::{DeserializeOwned, Error as _};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use stakechain_encoding::{
    impl_encoding, to_fixed_bytes, Codec, Compact, CompactDecode, CompactEncode, EncodingError,
    Fixed, FixedDecode, FixedEncode, MAX_SLICE_SIZE,
};
use std::fmt;
use std::io::{Read, Write};
use thiserror::Error;

/// Size of an atomic swap secret and of its hash.
pub const ATOMIC_SWAP_SECRET_LEN: usize = HASH_SIZE;

/// Lock times below this value are block heights; from it on they are unix seconds.
pub const LOCK_TIME_MIN_TIMESTAMP_VALUE: u64 = 500_000_000;

/// Errors returned by the strict (standardness) checks of conditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("unsupported unlock type '{0}' by unlock hash condition")]
    UnsupportedUnlockType(UnlockType),
    #[error("nil crypto hash cannot be used as unlock hash")]
    NilUnlockHash,
    #[error("unsupported unlock hash {role} type: {unlock_type}")]
    UnsupportedCounterpartyType {
        role: &'static str,
        unlock_type: UnlockType,
    },
    #[error("nil hashed secret not allowed")]
    NilHashedSecret,
    #[error("atomic swap sender and receiver cannot be the same")]
    IdenticalCounterparties,
    #[error("lock time has to be defined")]
    ZeroLockTime,
    #[error("non-standard unlock hash type")]
    NonStandardInnerUnlockType,
    #[error("unexpected internal unlock condition {0:?} used as part of time lock condition")]
    UnsupportedInnerCondition(ConditionType),
    #[error("a minimum amount of required signatures must be specified")]
    ZeroMinimumSignatureCount,
    #[error("at least two unlock hashes must be provided")]
    TooFewUnlockHashes,
    #[error("the minimum amount of signatures can't be higher than the amount of unlock hashes")]
    MinimumExceedsUnlockHashes,
    #[error("unsupported unlock hash #{index} type: {unlock_type}")]
    UnsupportedSignatoryType {
        index: usize,
        unlock_type: UnlockType,
    },
}

macro_rules! define_secret {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub [u8; ATOMIC_SWAP_SECRET_LEN]);

        impl $name {
            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; ATOMIC_SWAP_SECRET_LEN]
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
                let mut out = [0u8; ATOMIC_SWAP_SECRET_LEN];
                hex::decode_to_slice(s, &mut out)?;
                Ok(Self(out))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(D::Error::custom)
            }
        }

        impl_encoding!($name, 0);
    };
}

define_secret!(
    /// The pre-image a receiver reveals to claim an atomic swap.
    AtomicSwapSecret
);

define_secret!(
    /// sha256 of an [`AtomicSwapSecret`].
    AtomicSwapHashedSecret
);

impl AtomicSwapSecret {
    /// A fresh secret from the operating system's RNG.
    pub fn random() -> Self {
        let mut secret = [0u8; ATOMIC_SWAP_SECRET_LEN];
        OsRng.fill_bytes(&mut secret);
        Self(secret)
    }

    pub fn hashed(&self) -> AtomicSwapHashedSecret {
        AtomicSwapHashedSecret(Sha256::digest(self.0).into())
    }
}

/// Type tag of an unlock condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConditionType {
    Nil = 0,
    UnlockHash = 1,
    AtomicSwap = 2,
    TimeLock = 3,
    MultiSignature = 4,
}

impl ConditionType {
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Nil),
            1 => Some(Self::UnlockHash),
            2 => Some(Self::AtomicSwap),
            3 => Some(Self::TimeLock),
            4 => Some(Self::MultiSignature),
            _ => None,
        }
    }
}

/// Locks an output to whoever can fulfill the target unlock hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockHashCondition {
    #[serde(rename = "unlockhash")]
    pub target_unlock_hash: UnlockHash,
}

impl_encoding!(UnlockHashCondition, target_unlock_hash);

impl UnlockHashCondition {
    pub fn new(target_unlock_hash: UnlockHash) -> Self {
        Self { target_unlock_hash }
    }

    pub fn is_standard(&self) -> Result<(), ConditionError> {
        let uh = &self.target_unlock_hash;
        if uh.unlock_type != UnlockType::PUBLIC_KEY && uh.unlock_type != UnlockType::ATOMIC_SWAP {
            return Err(ConditionError::UnsupportedUnlockType(uh.unlock_type));
        }
        if uh.hash.is_zero() {
            return Err(ConditionError::NilUnlockHash);
        }
        Ok(())
    }
}

/// A hash-time-locked contract between two parties.
///
/// Until `time_lock` the receiver can claim the output by revealing the
/// secret; after it the sender can take a refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicSwapCondition {
    pub sender: UnlockHash,
    pub receiver: UnlockHash,
    #[serde(rename = "hashedsecret")]
    pub hashed_secret: AtomicSwapHashedSecret,
    #[serde(rename = "timelock")]
    pub time_lock: Timestamp,
}

impl_encoding!(AtomicSwapCondition, sender, receiver, hashed_secret, time_lock);

impl AtomicSwapCondition {
    pub fn unlock_hash(&self) -> UnlockHash {
        UnlockHash::new(UnlockType::ATOMIC_SWAP, hash_object(&to_fixed_bytes(self)))
    }

    pub fn is_standard(&self) -> Result<(), ConditionError> {
        if self.sender.unlock_type != UnlockType::PUBLIC_KEY {
            return Err(ConditionError::UnsupportedCounterpartyType {
                role: "sender",
                unlock_type: self.sender.unlock_type,
            });
        }
        if self.receiver.unlock_type != UnlockType::PUBLIC_KEY {
            return Err(ConditionError::UnsupportedCounterpartyType {
                role: "receiver",
                unlock_type: self.receiver.unlock_type,
            });
        }
        if self.sender.hash.is_zero() || self.receiver.hash.is_zero() {
            return Err(ConditionError::NilUnlockHash);
        }
        if self.hashed_secret.is_zero() {
            return Err(ConditionError::NilHashedSecret);
        }
        if self.sender == self.receiver {
            return Err(ConditionError::IdenticalCounterparties);
        }
        Ok(())
    }
}

/// Wraps another condition so it can only be fulfilled once a block
/// height or timestamp is reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLockCondition {
    #[serde(rename = "locktime")]
    pub lock_time: u64,
    #[serde(deserialize_with = "deserialize_inner_condition")]
    pub condition: Box<UnlockCondition>,
}

fn deserialize_inner_condition<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Box<UnlockCondition>, D::Error> {
    let condition = UnlockCondition::deserialize(deserializer)?;
    let tag = condition.condition_type() as u8;
    if !TimeLockCondition::accepts_inner(tag) {
        return Err(D::Error::custom(format!(
            "condition type {} cannot be wrapped by a time lock",
            tag
        )));
    }
    Ok(Box::new(condition))
}

impl TimeLockCondition {
    pub fn new(lock_time: u64, condition: UnlockCondition) -> Self {
        Self {
            lock_time,
            condition: Box::new(condition),
        }
    }

    /// Only nil, unlock hash and multisig conditions can be time locked.
    pub fn accepts_inner(tag: u8) -> bool {
        matches!(
            ConditionType::from_u8(tag),
            Some(ConditionType::Nil | ConditionType::UnlockHash | ConditionType::MultiSignature)
        )
    }

    pub fn fulfillable(&self, ctx: FulfillableContext) -> bool {
        if self.lock_time < LOCK_TIME_MIN_TIMESTAMP_VALUE {
            self.lock_time <= ctx.block_height
        } else {
            self.lock_time <= ctx.block_time
        }
    }

    pub fn is_standard(&self) -> Result<(), ConditionError> {
        if self.lock_time == 0 {
            return Err(ConditionError::ZeroLockTime);
        }
        match self.condition.as_ref() {
            UnlockCondition::Nil => Ok(()),
            UnlockCondition::UnlockHash(c) => {
                if c.target_unlock_hash.hash.is_zero() {
                    return Err(ConditionError::NilUnlockHash);
                }
                if c.target_unlock_hash.unlock_type != UnlockType::PUBLIC_KEY {
                    return Err(ConditionError::NonStandardInnerUnlockType);
                }
                Ok(())
            }
            UnlockCondition::MultiSignature(c) => c.is_standard(),
            other => Err(ConditionError::UnsupportedInnerCondition(
                other.condition_type(),
            )),
        }
    }
}

/// Requires signatures from at least `minimum_signature_count` of the
/// listed (public key) unlock hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSignatureCondition {
    #[serde(rename = "unlockhashes")]
    pub unlock_hashes: Vec<UnlockHash>,
    #[serde(rename = "minimumsignaturecount")]
    pub minimum_signature_count: u64,
}

impl_encoding!(MultiSignatureCondition, minimum_signature_count, unlock_hashes);

impl MultiSignatureCondition {
    pub fn new(unlock_hashes: Vec<UnlockHash>, minimum_signature_count: u64) -> Self {
        Self {
            unlock_hashes,
            minimum_signature_count,
        }
    }

    /// Merkle root over the signatory count, the sorted signatories and the
    /// minimum. Sorting makes the result independent of the listed order.
    pub fn unlock_hash(&self) -> UnlockHash {
        let mut sorted = self.unlock_hashes.clone();
        sorted.sort();
        let mut tree = MerkleTree::new();
        tree.push_object(&(sorted.len() as u64));
        for uh in &sorted {
            tree.push_object(uh);
        }
        tree.push_object(&self.minimum_signature_count);
        UnlockHash::new(UnlockType::MULTI_SIG, tree.root())
    }

    pub fn is_standard(&self) -> Result<(), ConditionError> {
        if self.minimum_signature_count == 0 {
            return Err(ConditionError::ZeroMinimumSignatureCount);
        }
        if self.unlock_hashes.len() < 2 {
            return Err(ConditionError::TooFewUnlockHashes);
        }
        if self.minimum_signature_count > self.unlock_hashes.len() as u64 {
            return Err(ConditionError::MinimumExceedsUnlockHashes);
        }
        for (index, uh) in self.unlock_hashes.iter().enumerate() {
            if uh.unlock_type != UnlockType::PUBLIC_KEY {
                return Err(ConditionError::UnsupportedSignatoryType {
                    index,
                    unlock_type: uh.unlock_type,
                });
            }
        }
        Ok(())
    }
}

/// The condition an output is locked with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UnlockCondition {
    /// Locks nothing and can never be spent.
    #[default]
    Nil,
    UnlockHash(UnlockHashCondition),
    AtomicSwap(AtomicSwapCondition),
    TimeLock(TimeLockCondition),
    MultiSignature(MultiSignatureCondition),
}

impl From<UnlockHash> for UnlockCondition {
    fn from(uh: UnlockHash) -> Self {
        Self::UnlockHash(UnlockHashCondition::new(uh))
    }
}

impl UnlockCondition {
    pub fn condition_type(&self) -> ConditionType {
        match self {
            Self::Nil => ConditionType::Nil,
            Self::UnlockHash(_) => ConditionType::UnlockHash,
            Self::AtomicSwap(_) => ConditionType::AtomicSwap,
            Self::TimeLock(_) => ConditionType::TimeLock,
            Self::MultiSignature(_) => ConditionType::MultiSignature,
        }
    }

    /// The unlock hash this condition commits to; a time lock reports the
    /// hash of the condition it wraps.
    pub fn unlock_hash(&self) -> UnlockHash {
        match self {
            Self::Nil => UnlockHash::NIL,
            Self::UnlockHash(c) => c.target_unlock_hash,
            Self::AtomicSwap(c) => c.unlock_hash(),
            Self::TimeLock(c) => c.condition.unlock_hash(),
            Self::MultiSignature(c) => c.unlock_hash(),
        }
    }

    /// Whether the chain state allows this condition to be fulfilled at all.
    pub fn fulfillable(&self, ctx: FulfillableContext) -> bool {
        match self {
            Self::TimeLock(c) => c.fulfillable(ctx),
            _ => true,
        }
    }

    /// Strict checks applied to conditions of standard transactions.
    pub fn is_standard(&self) -> Result<(), ConditionError> {
        match self {
            Self::Nil => Ok(()),
            Self::UnlockHash(c) => c.is_standard(),
            Self::AtomicSwap(c) => c.is_standard(),
            Self::TimeLock(c) => c.is_standard(),
            Self::MultiSignature(c) => c.is_standard(),
        }
    }

    /// Check that `fulfillment` satisfies this condition.
    pub fn fulfill(
        &self,
        fulfillment: &UnlockFulfillment,
        ctx: &FulfillContext<'_>,
    ) -> Result<(), FulfillmentError> {
        use UnlockFulfillment as F;

        match (self, fulfillment) {
            (Self::UnlockHash(c), F::SingleSignature(f)) => {
                if c.target_unlock_hash.unlock_type != UnlockType::PUBLIC_KEY {
                    return Err(FulfillmentError::UnexpectedUnlockType);
                }
                f.fulfill_unlock_hash(&c.target_unlock_hash, ctx)
            }
            (Self::UnlockHash(c), F::LegacyAtomicSwap(f)) => {
                if c.target_unlock_hash.unlock_type != UnlockType::ATOMIC_SWAP {
                    return Err(FulfillmentError::UnexpectedUnlockType);
                }
                f.fulfill_unlock_hash(&c.target_unlock_hash, ctx)
            }
            (Self::AtomicSwap(c), F::AtomicSwap(f)) => f.fulfill_condition(c, ctx),
            (Self::AtomicSwap(c), F::LegacyAtomicSwap(f)) => f.fulfill_condition(c, ctx),
            (Self::MultiSignature(c), F::MultiSignature(f)) => f.fulfill_condition(c, ctx),
            (Self::TimeLock(c), F::SingleSignature(_) | F::MultiSignature(_)) => {
                if !c.fulfillable(ctx.fulfillable()) {
                    return Err(FulfillmentError::TimeLockNotReached);
                }
                c.condition.fulfill(fulfillment, ctx)
            }
            _ => Err(FulfillmentError::Mismatch),
        }
    }

    fn write_payload<C: Codec>(&self, buf: &mut Vec<u8>) -> stakechain_encoding::Result<()> {
        match self {
            Self::Nil => Ok(()),
            Self::UnlockHash(c) => C::encode(c, buf),
            Self::AtomicSwap(c) => C::encode(c, buf),
            // the wrapped condition is inlined: its tag, then its bare payload
            Self::TimeLock(c) => {
                C::encode(&c.lock_time, buf)?;
                C::encode(&(c.condition.condition_type() as u8), buf)?;
                c.condition.write_payload::<C>(buf)
            }
            Self::MultiSignature(c) => C::encode(c, buf),
        }
    }

    fn read_payload<C: Codec>(tag: u8, payload: &[u8]) -> stakechain_encoding::Result<Self> {
        let condition_type = ConditionType::from_u8(tag).ok_or(EncodingError::UnknownTag {
            kind: "unlock condition",
            tag,
        })?;
        match condition_type {
            ConditionType::Nil => {
                if !payload.is_empty() {
                    return Err(EncodingError::invalid(
                        "unexpected byte content for nil condition",
                    ));
                }
                Ok(Self::Nil)
            }
            ConditionType::UnlockHash => C::from_bytes(payload).map(Self::UnlockHash),
            ConditionType::AtomicSwap => C::from_bytes(payload).map(Self::AtomicSwap),
            ConditionType::TimeLock => {
                let mut cursor = payload;
                let lock_time: u64 = C::decode(&mut cursor)?;
                let inner_tag: u8 = C::decode(&mut cursor)?;
                if !TimeLockCondition::accepts_inner(inner_tag) {
                    return Err(EncodingError::invalid(format!(
                        "condition type {} cannot be wrapped by a time lock",
                        inner_tag
                    )));
                }
                let condition = Self::read_payload::<C>(inner_tag, cursor)?;
                Ok(Self::TimeLock(TimeLockCondition::new(lock_time, condition)))
            }
            ConditionType::MultiSignature => C::from_bytes(payload).map(Self::MultiSignature),
        }
    }

    fn encode_envelope<C: Codec, W: Write + ?Sized>(
        &self,
        w: &mut W,
    ) -> stakechain_encoding::Result<()> {
        let mut payload = Vec::new();
        self.write_payload::<C>(&mut payload)?;
        C::encode(&(self.condition_type() as u8), w)?;
        C::write_bytes(w, &payload)
    }

    fn decode_envelope<C: Codec, R: Read + ?Sized>(r: &mut R) -> stakechain_encoding::Result<Self> {
        let tag: u8 = C::decode(r)?;
        let payload = C::read_bytes(r, MAX_SLICE_SIZE)?;
        Self::read_payload::<C>(tag, &payload)
    }
}

impl FixedEncode for UnlockCondition {
    fn fixed_encode<W: Write + ?Sized>(&self, w: &mut W) -> stakechain_encoding::Result<()> {
        self.encode_envelope::<Fixed, W>(w)
    }
}

impl FixedDecode for UnlockCondition {
    fn fixed_decode<R: Read + ?Sized>(r: &mut R) -> stakechain_encoding::Result<Self> {
        Self::decode_envelope::<Fixed, R>(r)
    }
}

impl CompactEncode for UnlockCondition {
    fn compact_encode<W: Write + ?Sized>(&self, w: &mut W) -> stakechain_encoding::Result<()> {
        self.encode_envelope::<Compact, W>(w)
    }
}

impl CompactDecode for UnlockCondition {
    fn compact_decode<R: Read + ?Sized>(r: &mut R) -> stakechain_encoding::Result<Self> {
        Self::decode_envelope::<Compact, R>(r)
    }
}

/// The JSON envelope shared by conditions and fulfillments.
#[derive(Deserialize)]
pub(crate) struct RawEnvelope {
    #[serde(rename = "type", default)]
    pub kind: u8,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

pub(crate) fn envelope_data<T: DeserializeOwned, E: serde::de::Error>(
    data: Option<serde_json::Value>,
) -> Result<T, E> {
    serde_json::from_value(data.unwrap_or(serde_json::Value::Null)).map_err(E::custom)
}

impl Serialize for UnlockCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        let kind = self.condition_type() as u8;
        match self {
            Self::Nil => {}
            Self::UnlockHash(c) => {
                map.serialize_entry("type", &kind)?;
                map.serialize_entry("data", c)?;
            }
            Self::AtomicSwap(c) => {
                map.serialize_entry("type", &kind)?;
                map.serialize_entry("data", c)?;
            }
            Self::TimeLock(c) => {
                map.serialize_entry("type", &kind)?;
                map.serialize_entry("data", c)?;
            }
            Self::MultiSignature(c) => {
                map.serialize_entry("type", &kind)?;
                map.serialize_entry("data", c)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for UnlockCondition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawEnvelope::deserialize(deserializer)?;
        let condition_type = ConditionType::from_u8(raw.kind)
            .ok_or_else(|| D::Error::custom(format!("unknown condition type {}", raw.kind)))?;
        match condition_type {
            ConditionType::Nil => Ok(Self::Nil),
            ConditionType::UnlockHash => envelope_data(raw.data).map(Self::UnlockHash),
            ConditionType::AtomicSwap => envelope_data(raw.data).map(Self::AtomicSwap),
            ConditionType::TimeLock => envelope_data(raw.data).map(Self::TimeLock),
            ConditionType::MultiSignature => envelope_data(raw.data).map(Self::MultiSignature),
        }
    }
}
