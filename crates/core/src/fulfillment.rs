//! Unlock fulfillments: the proofs inputs carry to spend an output.
//!
//! A fulfillment pairs with the condition of the output it spends (see
//! [`UnlockCondition::fulfill`]). It travels in the same tagged envelope as
//! conditions.

use crate::block::Timestamp;
use crate::condition::{
    envelope_data, AtomicSwapCondition, AtomicSwapHashedSecret, AtomicSwapSecret, ConditionError,
    RawEnvelope, UnlockCondition,
};
use crate::crypto::{strict_signature_check, ByteSlice, CryptoError, PublicKey};
use crate::signing::{ExtraObject, FulfillContext, SignContext};
use crate::unlockhash::UnlockHash;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use stakechain_encoding::{
    impl_encoding, Codec, Compact, CompactDecode, CompactEncode, EncodingError, Fixed, FixedDecode,
    FixedEncode, MAX_SLICE_SIZE,
};
use std::io::{Read, Write};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FulfillmentError {
    #[error("unlock condition fulfillment mismatch")]
    Mismatch,
    #[error("unexpected unlock (hash) type")]
    UnexpectedUnlockType,
    #[error("single signature fulfillment provides wrong public key")]
    WrongPublicKey,
    #[error("produced unlock hash doesn't equal the expected unlock hash")]
    UnlockHashMismatch,
    #[error("invalid input redeemer")]
    InvalidRedeemer,
    #[error("invalid pre-image sha256")]
    InvalidPreImageSha256,
    #[error("contract cannot yet be refunded")]
    PrematureRefund,
    #[error("time lock has not yet been reached")]
    TimeLockNotReached,
    #[error("legacy atomic swap fulfillment defines an incorrect sender")]
    IncorrectSender,
    #[error("legacy atomic swap fulfillment defines an incorrect receiver")]
    IncorrectReceiver,
    #[error("legacy atomic swap fulfillment defines an incorrect time lock")]
    IncorrectTimeLock,
    #[error("legacy atomic swap fulfillment defines an incorrect hashed secret")]
    IncorrectHashedSecret,
    #[error("not enough signatures")]
    InsufficientSignatures,
    #[error("transaction contains a frivolous signature")]
    FrivolousSignature,
    #[error("public key used which is not allowed to sign this input")]
    UnauthorizedPubKey,
    #[error("public key was used multiple times while signing transaction")]
    PublicKeyOveruse,
    #[error("fulfillment has no signature")]
    MissingSignature,
    #[error("cannot sign a fulfillment which is already signed")]
    AlreadySigned,
    #[error("signing key does not belong to the fulfillment's public key")]
    SigningKeyMismatch,
    #[error("nil fulfillment type")]
    NilFulfillment,
    #[error("at least one pair must be provided")]
    NoSignaturePairs,
    #[error(transparent)]
    Condition(#[from] ConditionError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

pub type Result<T> = std::result::Result<T, FulfillmentError>;

/// Type tag of an unlock fulfillment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FulfillmentType {
    Nil = 0,
    SingleSignature = 1,
    AtomicSwap = 2,
    MultiSignature = 3,
}

impl FulfillmentType {
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Nil),
            1 => Some(Self::SingleSignature),
            2 => Some(Self::AtomicSwap),
            3 => Some(Self::MultiSignature),
            _ => None,
        }
    }
}

fn verify_signature(
    public_key: &PublicKey,
    signature: &ByteSlice,
    ctx: &FulfillContext<'_>,
    extras: &[ExtraObject],
) -> Result<()> {
    if signature.is_empty() {
        return Err(FulfillmentError::MissingSignature);
    }
    let hash = ctx.transaction.signature_hash(extras);
    public_key.verify_hash(&hash, signature.as_bytes())?;
    Ok(())
}

fn create_signature(
    public_key: &PublicKey,
    ctx: &SignContext<'_>,
    extras: &[ExtraObject],
) -> Result<ByteSlice> {
    if ctx.key.public_key != *public_key {
        return Err(FulfillmentError::SigningKeyMismatch);
    }
    let hash = ctx.transaction.signature_hash(extras);
    Ok(ctx.key.sign_hash(&hash))
}

// Claims sign over the revealed secret as well; refunds only over the key.
fn atomic_swap_extras(
    mut extras: Vec<ExtraObject>,
    public_key: &PublicKey,
    secret: &AtomicSwapSecret,
) -> Vec<ExtraObject> {
    extras.push(ExtraObject::PublicKey(public_key.clone()));
    if !secret.is_zero() {
        extras.push(ExtraObject::Secret(*secret));
    }
    extras
}

/// A single ed25519 signature from the key behind a public key unlock hash.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SingleSignatureFulfillment {
    #[serde(rename = "publickey")]
    pub public_key: PublicKey,
    pub signature: ByteSlice,
}

impl_encoding!(SingleSignatureFulfillment, public_key, signature);

impl SingleSignatureFulfillment {
    /// An unsigned fulfillment for `public_key`.
    pub fn new(public_key: PublicKey) -> Self {
        Self {
            public_key,
            signature: ByteSlice::default(),
        }
    }

    pub fn fulfill_unlock_hash(&self, target: &UnlockHash, ctx: &FulfillContext<'_>) -> Result<()> {
        if UnlockHash::from_public_key(&self.public_key) != *target {
            return Err(FulfillmentError::WrongPublicKey);
        }
        verify_signature(&self.public_key, &self.signature, ctx, &ctx.extra_objects())
    }

    pub fn sign(&mut self, ctx: &SignContext<'_>) -> Result<()> {
        if !self.signature.is_empty() {
            return Err(FulfillmentError::AlreadySigned);
        }
        self.signature = create_signature(&self.public_key, ctx, &ctx.extra_objects())?;
        Ok(())
    }

    pub fn is_standard(&self) -> Result<()> {
        strict_signature_check(&self.public_key, self.signature.as_bytes())?;
        Ok(())
    }
}

/// Spends an atomic swap output, either as a claim (secret revealed) or as
/// a refund (zero secret).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AtomicSwapFulfillment {
    #[serde(rename = "publickey")]
    pub public_key: PublicKey,
    pub signature: ByteSlice,
    #[serde(default)]
    pub secret: AtomicSwapSecret,
}

impl_encoding!(AtomicSwapFulfillment, public_key, signature, secret);

impl AtomicSwapFulfillment {
    /// An unsigned fulfillment for the receiver, revealing `secret`.
    pub fn claim(public_key: PublicKey, secret: AtomicSwapSecret) -> Self {
        Self {
            public_key,
            signature: ByteSlice::default(),
            secret,
        }
    }

    /// An unsigned fulfillment for the sender taking back the funds.
    pub fn refund(public_key: PublicKey) -> Self {
        Self {
            public_key,
            ..Default::default()
        }
    }

    pub fn fulfill_condition(
        &self,
        condition: &AtomicSwapCondition,
        ctx: &FulfillContext<'_>,
    ) -> Result<()> {
        let redeemer = UnlockHash::from_public_key(&self.public_key);
        if !self.secret.is_zero() {
            if redeemer != condition.receiver {
                return Err(FulfillmentError::InvalidRedeemer);
            }
            if self.secret.hashed() != condition.hashed_secret {
                return Err(FulfillmentError::InvalidPreImageSha256);
            }
        } else {
            if ctx.block_time <= condition.time_lock {
                return Err(FulfillmentError::PrematureRefund);
            }
            if redeemer != condition.sender {
                return Err(FulfillmentError::InvalidRedeemer);
            }
        }
        let extras = atomic_swap_extras(ctx.extra_objects(), &self.public_key, &self.secret);
        verify_signature(&self.public_key, &self.signature, ctx, &extras)
    }

    pub fn sign(&mut self, ctx: &SignContext<'_>) -> Result<()> {
        if !self.signature.is_empty() {
            return Err(FulfillmentError::AlreadySigned);
        }
        let extras = atomic_swap_extras(ctx.extra_objects(), &self.public_key, &self.secret);
        self.signature = create_signature(&self.public_key, ctx, &extras)?;
        Ok(())
    }

    pub fn is_standard(&self) -> Result<()> {
        strict_signature_check(&self.public_key, self.signature.as_bytes())?;
        Ok(())
    }
}

/// The pre-fork atomic swap fulfillment, which repeats the contract inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyAtomicSwapFulfillment {
    pub sender: UnlockHash,
    pub receiver: UnlockHash,
    #[serde(rename = "hashedsecret")]
    pub hashed_secret: AtomicSwapHashedSecret,
    #[serde(rename = "timelock")]
    pub time_lock: Timestamp,
    #[serde(rename = "publickey")]
    pub public_key: PublicKey,
    pub signature: ByteSlice,
    #[serde(default)]
    pub secret: AtomicSwapSecret,
}

impl_encoding!(
    LegacyAtomicSwapFulfillment,
    sender,
    receiver,
    hashed_secret,
    time_lock,
    public_key,
    signature,
    secret
);

impl LegacyAtomicSwapFulfillment {
    /// The contract this fulfillment carries.
    pub fn condition(&self) -> AtomicSwapCondition {
        AtomicSwapCondition {
            sender: self.sender,
            receiver: self.receiver,
            hashed_secret: self.hashed_secret,
            time_lock: self.time_lock,
        }
    }

    fn as_current(&self) -> AtomicSwapFulfillment {
        AtomicSwapFulfillment {
            public_key: self.public_key.clone(),
            signature: self.signature.clone(),
            secret: self.secret,
        }
    }

    pub fn fulfill_condition(
        &self,
        condition: &AtomicSwapCondition,
        ctx: &FulfillContext<'_>,
    ) -> Result<()> {
        if self.sender != condition.sender {
            return Err(FulfillmentError::IncorrectSender);
        }
        if self.receiver != condition.receiver {
            return Err(FulfillmentError::IncorrectReceiver);
        }
        if self.time_lock != condition.time_lock {
            return Err(FulfillmentError::IncorrectTimeLock);
        }
        if self.hashed_secret != condition.hashed_secret {
            return Err(FulfillmentError::IncorrectHashedSecret);
        }
        self.as_current().fulfill_condition(condition, ctx)
    }

    /// Fulfill an atomic swap unlock hash, as used by v0 outputs.
    ///
    /// Up to and including the time lock only the receiver can spend, and
    /// must reveal the secret. After it only the sender can.
    pub fn fulfill_unlock_hash(&self, target: &UnlockHash, ctx: &FulfillContext<'_>) -> Result<()> {
        if self.condition().unlock_hash() != *target {
            return Err(FulfillmentError::UnlockHashMismatch);
        }
        let redeemer = UnlockHash::from_public_key(&self.public_key);
        if ctx.block_time <= self.time_lock {
            if redeemer != self.receiver {
                return Err(FulfillmentError::InvalidRedeemer);
            }
            let mut extras = ctx.extra_objects();
            extras.push(ExtraObject::PublicKey(self.public_key.clone()));
            extras.push(ExtraObject::Secret(self.secret));
            verify_signature(&self.public_key, &self.signature, ctx, &extras)?;
            if self.secret.hashed() != self.hashed_secret {
                return Err(FulfillmentError::InvalidPreImageSha256);
            }
            return Ok(());
        }
        if redeemer != self.sender {
            return Err(FulfillmentError::InvalidRedeemer);
        }
        let mut extras = ctx.extra_objects();
        extras.push(ExtraObject::PublicKey(self.public_key.clone()));
        verify_signature(&self.public_key, &self.signature, ctx, &extras)
    }

    pub fn sign(&mut self, ctx: &SignContext<'_>) -> Result<()> {
        if !self.signature.is_empty() {
            return Err(FulfillmentError::AlreadySigned);
        }
        let extras = atomic_swap_extras(ctx.extra_objects(), &self.public_key, &self.secret);
        self.signature = create_signature(&self.public_key, ctx, &extras)?;
        Ok(())
    }

    pub fn is_standard(&self) -> Result<()> {
        self.condition().is_standard()?;
        strict_signature_check(&self.public_key, self.signature.as_bytes())?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeySignaturePair {
    #[serde(rename = "publickey")]
    pub public_key: PublicKey,
    pub signature: ByteSlice,
}

impl_encoding!(PublicKeySignaturePair, public_key, signature);

/// Signatures from several of the keys listed by a multisig condition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MultiSignatureFulfillment {
    pub pairs: Vec<PublicKeySignaturePair>,
}

impl_encoding!(MultiSignatureFulfillment, pairs);

impl MultiSignatureFulfillment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fulfill_condition(
        &self,
        condition: &crate::condition::MultiSignatureCondition,
        ctx: &FulfillContext<'_>,
    ) -> Result<()> {
        if (self.pairs.len() as u64) < condition.minimum_signature_count {
            return Err(FulfillmentError::InsufficientSignatures);
        }
        if self.pairs.len() > condition.unlock_hashes.len() {
            return Err(FulfillmentError::FrivolousSignature);
        }
        let mut unused = condition.unlock_hashes.clone();
        for pair in &self.pairs {
            let uh = UnlockHash::from_public_key(&pair.public_key);
            match unused.iter().position(|candidate| *candidate == uh) {
                Some(pos) => {
                    unused.swap_remove(pos);
                }
                None if condition.unlock_hashes.contains(&uh) => {
                    return Err(FulfillmentError::PublicKeyOveruse)
                }
                None => return Err(FulfillmentError::UnauthorizedPubKey),
            }
            let mut extras = ctx.extra_objects();
            extras.push(ExtraObject::PublicKey(pair.public_key.clone()));
            verify_signature(&pair.public_key, &pair.signature, ctx, &extras)?;
        }
        Ok(())
    }

    /// Add a signature from `ctx.key`.
    pub fn sign(&mut self, ctx: &SignContext<'_>) -> Result<()> {
        let public_key = &ctx.key.public_key;
        if self.pairs.iter().any(|pair| pair.public_key == *public_key) {
            return Err(FulfillmentError::AlreadySigned);
        }
        let mut extras = ctx.extra_objects();
        extras.push(ExtraObject::PublicKey(public_key.clone()));
        let signature = create_signature(public_key, ctx, &extras)?;
        self.pairs.push(PublicKeySignaturePair {
            public_key: public_key.clone(),
            signature,
        });
        Ok(())
    }

    pub fn is_standard(&self) -> Result<()> {
        if self.pairs.is_empty() {
            return Err(FulfillmentError::NoSignaturePairs);
        }
        for pair in &self.pairs {
            strict_signature_check(&pair.public_key, pair.signature.as_bytes())?;
        }
        Ok(())
    }
}

/// The fulfillment an input carries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UnlockFulfillment {
    /// Fulfills nothing; only valid as a placeholder.
    #[default]
    Nil,
    SingleSignature(SingleSignatureFulfillment),
    AtomicSwap(AtomicSwapFulfillment),
    LegacyAtomicSwap(LegacyAtomicSwapFulfillment),
    MultiSignature(MultiSignatureFulfillment),
}

impl UnlockFulfillment {
    /// Both atomic swap shapes share a tag.
    pub fn fulfillment_type(&self) -> FulfillmentType {
        match self {
            Self::Nil => FulfillmentType::Nil,
            Self::SingleSignature(_) => FulfillmentType::SingleSignature,
            Self::AtomicSwap(_) | Self::LegacyAtomicSwap(_) => FulfillmentType::AtomicSwap,
            Self::MultiSignature(_) => FulfillmentType::MultiSignature,
        }
    }

    /// Sign in place, using the transaction and input index of `ctx`.
    pub fn sign(&mut self, ctx: &SignContext<'_>) -> Result<()> {
        match self {
            Self::Nil => Err(FulfillmentError::NilFulfillment),
            Self::SingleSignature(f) => f.sign(ctx),
            Self::AtomicSwap(f) => f.sign(ctx),
            Self::LegacyAtomicSwap(f) => f.sign(ctx),
            Self::MultiSignature(f) => f.sign(ctx),
        }
    }

    /// Strict checks applied to fulfillments of standard transactions.
    pub fn is_standard(&self) -> Result<()> {
        match self {
            Self::Nil => Err(FulfillmentError::NilFulfillment),
            Self::SingleSignature(f) => f.is_standard(),
            Self::AtomicSwap(f) => f.is_standard(),
            Self::LegacyAtomicSwap(f) => f.is_standard(),
            Self::MultiSignature(f) => f.is_standard(),
        }
    }

    /// Check this fulfillment against `condition`.
    pub fn verify(&self, condition: &UnlockCondition, ctx: &FulfillContext<'_>) -> Result<()> {
        condition.fulfill(self, ctx)
    }

    fn write_payload<C: Codec>(&self, buf: &mut Vec<u8>) -> stakechain_encoding::Result<()> {
        match self {
            Self::Nil => Ok(()),
            Self::SingleSignature(f) => C::encode(f, buf),
            Self::AtomicSwap(f) => C::encode(f, buf),
            Self::LegacyAtomicSwap(f) => C::encode(f, buf),
            Self::MultiSignature(f) => C::encode(f, buf),
        }
    }

    fn read_payload<C: Codec>(tag: u8, payload: &[u8]) -> stakechain_encoding::Result<Self> {
        let fulfillment_type = FulfillmentType::from_u8(tag).ok_or(EncodingError::UnknownTag {
            kind: "unlock fulfillment",
            tag,
        })?;
        match fulfillment_type {
            FulfillmentType::Nil => {
                if !payload.is_empty() {
                    return Err(EncodingError::invalid(
                        "unexpected byte content for nil fulfillment",
                    ));
                }
                Ok(Self::Nil)
            }
            FulfillmentType::SingleSignature => C::from_bytes(payload).map(Self::SingleSignature),
            // the current shape is tried first; it has to consume the whole payload
            FulfillmentType::AtomicSwap => match C::from_bytes(payload) {
                Ok(f) => Ok(Self::AtomicSwap(f)),
                Err(_) => C::from_bytes(payload).map(Self::LegacyAtomicSwap),
            },
            FulfillmentType::MultiSignature => C::from_bytes(payload).map(Self::MultiSignature),
        }
    }

    fn encode_envelope<C: Codec, W: Write + ?Sized>(
        &self,
        w: &mut W,
    ) -> stakechain_encoding::Result<()> {
        let mut payload = Vec::new();
        self.write_payload::<C>(&mut payload)?;
        C::encode(&(self.fulfillment_type() as u8), w)?;
        C::write_bytes(w, &payload)
    }

    fn decode_envelope<C: Codec, R: Read + ?Sized>(r: &mut R) -> stakechain_encoding::Result<Self> {
        let tag: u8 = C::decode(r)?;
        let payload = C::read_bytes(r, MAX_SLICE_SIZE)?;
        Self::read_payload::<C>(tag, &payload)
    }
}

impl FixedEncode for UnlockFulfillment {
    fn fixed_encode<W: Write + ?Sized>(&self, w: &mut W) -> stakechain_encoding::Result<()> {
        self.encode_envelope::<Fixed, W>(w)
    }
}

impl FixedDecode for UnlockFulfillment {
    fn fixed_decode<R: Read + ?Sized>(r: &mut R) -> stakechain_encoding::Result<Self> {
        Self::decode_envelope::<Fixed, R>(r)
    }
}

impl CompactEncode for UnlockFulfillment {
    fn compact_encode<W: Write + ?Sized>(&self, w: &mut W) -> stakechain_encoding::Result<()> {
        self.encode_envelope::<Compact, W>(w)
    }
}

impl CompactDecode for UnlockFulfillment {
    fn compact_decode<R: Read + ?Sized>(r: &mut R) -> stakechain_encoding::Result<Self> {
        Self::decode_envelope::<Compact, R>(r)
    }
}

impl Serialize for UnlockFulfillment {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        let kind = self.fulfillment_type() as u8;
        match self {
            Self::Nil => {}
            Self::SingleSignature(f) => {
                map.serialize_entry("type", &kind)?;
                map.serialize_entry("data", f)?;
            }
            Self::AtomicSwap(f) => {
                map.serialize_entry("type", &kind)?;
                map.serialize_entry("data", f)?;
            }
            Self::LegacyAtomicSwap(f) => {
                map.serialize_entry("type", &kind)?;
                map.serialize_entry("data", f)?;
            }
            Self::MultiSignature(f) => {
                map.serialize_entry("type", &kind)?;
                map.serialize_entry("data", f)?;
            }
        }
        map.end()
    }
}

// Either atomic swap shape; the legacy fields must be all present or all absent.
#[derive(Deserialize)]
struct AnyAtomicSwapFulfillment {
    #[serde(default)]
    sender: UnlockHash,
    #[serde(default)]
    receiver: UnlockHash,
    #[serde(rename = "hashedsecret", default)]
    hashed_secret: AtomicSwapHashedSecret,
    #[serde(rename = "timelock", default)]
    time_lock: Timestamp,
    #[serde(rename = "publickey")]
    public_key: PublicKey,
    signature: ByteSlice,
    #[serde(default)]
    secret: AtomicSwapSecret,
}

impl AnyAtomicSwapFulfillment {
    fn into_fulfillment<E: serde::de::Error>(self) -> std::result::Result<UnlockFulfillment, E> {
        let undefined = [
            self.sender.is_nil(),
            self.receiver.is_nil(),
            self.time_lock == 0,
            self.hashed_secret.is_zero(),
        ]
        .iter()
        .filter(|undefined| **undefined)
        .count();
        match undefined {
            0 => Ok(UnlockFulfillment::LegacyAtomicSwap(LegacyAtomicSwapFulfillment {
                sender: self.sender,
                receiver: self.receiver,
                hashed_secret: self.hashed_secret,
                time_lock: self.time_lock,
                public_key: self.public_key,
                signature: self.signature,
                secret: self.secret,
            })),
            4 => Ok(UnlockFulfillment::AtomicSwap(AtomicSwapFulfillment {
                public_key: self.public_key,
                signature: self.signature,
                secret: self.secret,
            })),
            _ => Err(E::custom(
                "when an atomic swap fulfillment defines any of the legacy properties, all of them have to be given",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for UnlockFulfillment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawEnvelope::deserialize(deserializer)?;
        let fulfillment_type = FulfillmentType::from_u8(raw.kind)
            .ok_or_else(|| D::Error::custom(format!("unknown fulfillment type {}", raw.kind)))?;
        match fulfillment_type {
            FulfillmentType::Nil => Ok(Self::Nil),
            FulfillmentType::SingleSignature => envelope_data(raw.data).map(Self::SingleSignature),
            FulfillmentType::AtomicSwap => {
                envelope_data::<AnyAtomicSwapFulfillment, D::Error>(raw.data)?.into_fulfillment()
            }
            FulfillmentType::MultiSignature => envelope_data(raw.data).map(Self::MultiSignature),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakechain_encoding::{from_compact_bytes, from_fixed_bytes, to_compact_bytes, to_fixed_bytes};

    fn assert_fixed_vector(vector: &str) -> UnlockFulfillment {
        let bytes = hex::decode(vector).unwrap();
        let fulfillment: UnlockFulfillment = from_fixed_bytes(&bytes).unwrap();
        assert_eq!(hex::encode(to_fixed_bytes(&fulfillment)), vector);
        fulfillment
    }

    fn assert_compact_vector(vector: &str) -> UnlockFulfillment {
        let bytes = hex::decode(vector).unwrap();
        let fulfillment: UnlockFulfillment = from_compact_bytes(&bytes).unwrap();
        assert_eq!(hex::encode(to_compact_bytes(&fulfillment).unwrap()), vector);
        fulfillment
    }

    fn strip_ws(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_fixed_vectors() {
        let f = assert_fixed_vector("01800000000000000065643235353139000000000000000000200000000000000035fffffffffffffffffffffffffffffffffffffffffffffffff46fffffffffff4000000000000000fffffffffffffffffffffffffffff123ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff");
        assert_eq!(f.fulfillment_type(), FulfillmentType::SingleSignature);

        let f = assert_fixed_vector("020a01000000000000011234567891234567891234567891234567891234567891234567891234567891016363636363636363636363636363636363636363636363636363636363636363bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb07edb85a00000000656432353531390000000000000000002000000000000000abababababababababababababababababababababababababababababababab4000000000000000dededededededededededededededededededededededededededededededededededededededededededededededededededededededededededededededededabadabadabadabadabadabadabadabadabadabadabadabadabadabadabadaba");
        assert!(matches!(f, UnlockFulfillment::LegacyAtomicSwap(ref l) if l.time_lock == 0x5ab8ed07));

        let f = assert_fixed_vector("02a000000000000000656432353531390000000000000000002000000000000000fffffffffffffffffffffffffffffffff04fffffffffffffffffffffffffffff4000000000000000ffffffffffffffffffffffff56fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff2ffffffffffffffffff123ffffffffffafffffffffffeffffffffffffff");
        assert!(matches!(f, UnlockFulfillment::AtomicSwap(_)));

        let f = assert_fixed_vector("0388000000000000000100000000000000656432353531390000000000000000002000000000000000def123def123def123def123def123def123def123def123def123def123def14000000000000000ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef");
        assert!(matches!(f, UnlockFulfillment::MultiSignature(ref m) if m.pairs.len() == 1));
    }

    #[test]
    fn test_compact_vectors() {
        assert_compact_vector("01c40135fffffffffffffffffffffffffffffffffffffffffffffffff46fffffffffff80fffffffffffffffffffffffffffff123ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff");
        let f = assert_compact_vector("02b103011234567891234567891234567891234567891234567891234567891234567891016363636363636363636363636363636363636363636363636363636363636363bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb07edb85a0000000001abababababababababababababababababababababababababababababababab80dededededededededededededededededededededededededededededededededededededededededededededededededededededededededededededededededabadabadabadabadabadabadabadabadabadabadabadabadabadabadabadaba");
        assert!(matches!(f, UnlockFulfillment::LegacyAtomicSwap(_)));
        let f = assert_compact_vector("02090201fffffffffffffffffffffffffffffffff04fffffffffffffffffffffffffffff80ffffffffffffffffffffffff56fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff2ffffffffffffffffff123ffffffffffafffffffffffeffffffffffffff");
        assert!(matches!(f, UnlockFulfillment::AtomicSwap(_)));
        assert_compact_vector("03c60201def123def123def123def123def123def123def123def123def123def123def180ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef");
    }

    #[test]
    fn test_nil_encodings() {
        assert_eq!(to_fixed_bytes(&UnlockFulfillment::Nil), vec![0u8; 9]);
        assert_eq!(to_compact_bytes(&UnlockFulfillment::Nil).unwrap(), vec![0u8; 2]);
        assert_eq!(serde_json::to_string(&UnlockFulfillment::Nil).unwrap(), "{}");
        assert_eq!(
            UnlockFulfillment::Nil.is_standard(),
            Err(FulfillmentError::NilFulfillment)
        );
    }

    #[test]
    fn test_unknown_tags_rejected() {
        for vector in [
            "ff0c0000000000000048656c6c6f2c205465737421",
            "030d00000000000000ff48656c6c6f2c205465737421",
        ] {
            let bytes = hex::decode(vector).unwrap();
            assert!(from_fixed_bytes::<UnlockFulfillment>(&bytes).is_err(), "{}", vector);
        }
    }

    const PK: &str = "ed25519:ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";
    const SIG: &str = "abcdefabcdefabcdefabcdefabcdefabcdefabcdefabcdefabcdefabcdefabcdefabcdefabcdefabcdefabcdefabcdefabcdefabcdefabcdefabcdefabcdefab";
    const ZERO_SECRET: &str = "0000000000000000000000000000000000000000000000000000000000000000";
    const SECRET: &str = "def789def789def789def789def789dedef789def789def789def789def789de";
    const LEGACY_FIELDS: &str = r#""sender":"6453402d094ed0f336950c4be0feec37167aaaaf8b974d265900e49ab22773584cfe96393b1360","receiver":"0101234567890123456789012345678901012345678901234567890123456789018a50e31447b8","hashedsecret":"abc543defabc543defabc543defabc543defabc543defabc543defabc543defa","timelock":1522068743"#;

    fn json_round_trip(input: &str) -> String {
        let fulfillment: UnlockFulfillment = serde_json::from_str(input).unwrap();
        serde_json::to_string(&fulfillment).unwrap()
    }

    #[test]
    fn test_json_vectors() {
        assert_eq!(json_round_trip("{}"), "{}");
        assert_eq!(json_round_trip(r#"{"type":0}"#), "{}");
        assert_eq!(json_round_trip(r#"{"type":0,"data":null}"#), "{}");

        let single = format!(r#"{{"type":1,"data":{{"publickey":"{}","signature":"{}"}}}}"#, PK, SIG);
        assert_eq!(json_round_trip(&single), single);

        let legacy = format!(
            r#"{{"type":2,"data":{{{},"publickey":"{}","signature":"{}"}}}}"#,
            LEGACY_FIELDS, PK, SIG
        );
        let legacy_out = format!(
            r#"{{"type":2,"data":{{{},"publickey":"{}","signature":"{}","secret":"{}"}}}}"#,
            LEGACY_FIELDS, PK, SIG, ZERO_SECRET
        );
        assert_eq!(json_round_trip(&legacy), legacy_out);
        let legacy_with_secret = legacy_out.replace(ZERO_SECRET, SECRET);
        assert_eq!(json_round_trip(&legacy_with_secret), legacy_with_secret);

        let current = format!(r#"{{"type":2,"data":{{"publickey":"{}","signature":"{}"}}}}"#, PK, SIG);
        let current_out = format!(
            r#"{{"type":2,"data":{{"publickey":"{}","signature":"{}","secret":"{}"}}}}"#,
            PK, SIG, ZERO_SECRET
        );
        assert_eq!(json_round_trip(&current), current_out);

        let multi = strip_ws(&format!(
            r#"{{"type":3,"data":{{"pairs":[
                {{"publickey":"{pk}","signature":"{sig}"}},
                {{"publickey":"{pk}","signature":"{sig}"}}
            ]}}}}"#,
            pk = PK,
            sig = SIG
        ));
        assert_eq!(json_round_trip(&multi), multi);
    }

    #[test]
    fn test_json_partial_legacy_rejected() {
        let partial = format!(
            r#"{{"type":2,"data":{{"timelock":5,"publickey":"{}","signature":"{}"}}}}"#,
            PK, SIG
        );
        let err = serde_json::from_str::<UnlockFulfillment>(&partial).unwrap_err();
        assert!(err.to_string().contains("all of them have to be given"));
    }

    #[test]
    fn test_strict_checks() {
        let pk = PublicKey::ed25519([1; 32]);
        let signed = SingleSignatureFulfillment {
            public_key: pk.clone(),
            signature: ByteSlice(vec![0; 64]),
        };
        assert!(signed.is_standard().is_ok());
        assert_eq!(
            SingleSignatureFulfillment::new(pk.clone()).is_standard(),
            Err(FulfillmentError::Crypto(CryptoError::InvalidSignatureSize))
        );
        assert_eq!(
            MultiSignatureFulfillment::new().is_standard(),
            Err(FulfillmentError::NoSignaturePairs)
        );

        let legacy = LegacyAtomicSwapFulfillment {
            sender: UnlockHash::from_public_key(&pk),
            receiver: UnlockHash::from_public_key(&pk),
            hashed_secret: AtomicSwapHashedSecret([2; 32]),
            time_lock: 10,
            public_key: pk,
            signature: ByteSlice(vec![0; 64]),
            secret: AtomicSwapSecret::default(),
        };
        assert_eq!(
            legacy.is_standard(),
            Err(FulfillmentError::Condition(ConditionError::IdenticalCounterparties))
        );
    }
}
