//! The v0 transaction layout.
//!
//! Version 0 transactions predate unlock conditions: outputs carry a bare
//! unlock hash and inputs carry an "unlocker" that bundles the spent
//! condition with its fulfillment. Only single signature and (legacy)
//! atomic swap unlockers exist. This module converts between that layout
//! and the in-memory [`Transaction`], and computes the v0 signature hash.

use crate::condition::{AtomicSwapCondition, UnlockCondition};
use crate::crypto::{ByteSlice, PublicKey};
use crate::currency::Currency;
use crate::fulfillment::{
    AtomicSwapFulfillment, LegacyAtomicSwapFulfillment, SingleSignatureFulfillment,
    UnlockFulfillment,
};
use crate::hash::{Hash, ObjectHasher};
use crate::ids::{BlockStakeOutputId, CoinOutputId};
use crate::invariant::severe;
use crate::json::{base64_bytes, null_as_empty, nullable};
use crate::signing::ExtraObject;
use crate::transaction::{
    BlockStakeInput, BlockStakeOutput, CoinInput, CoinOutput, Transaction, TransactionVersion,
};
use crate::unlockhash::{UnlockHash, UnlockType};
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use stakechain_encoding::{
    impl_encoding, Codec, Compact, CompactDecode, CompactEncode, EncodingError, Fixed,
    FixedDecode, FixedEncode, MAX_SLICE_SIZE,
};
use std::io::{Read, Write};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LegacyError {
    #[error("only unlock hash conditions are supported for legacy transactions")]
    UnsupportedCondition,
    #[error("unlock type is invalid in a v0 transaction")]
    InvalidUnlockType,
    #[error("v0 transactions only support single-signature and atomic-swap unlock conditions")]
    UnsupportedUnlockType,
}

/// The condition and fulfillment of a v0 input, in one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyUnlocker {
    SingleSignature(SingleSignatureFulfillment),
    AtomicSwap(LegacyAtomicSwapFulfillment),
}

impl LegacyUnlocker {
    pub fn unlock_type(&self) -> UnlockType {
        match self {
            Self::SingleSignature(_) => UnlockType::PUBLIC_KEY,
            Self::AtomicSwap(_) => UnlockType::ATOMIC_SWAP,
        }
    }

    // type byte, then the condition and fulfillment as separate byte strings
    fn write<C: Codec, W: Write + ?Sized>(&self, w: &mut W) -> stakechain_encoding::Result<()> {
        C::encode(&self.unlock_type().0, w)?;
        match self {
            Self::SingleSignature(f) => {
                C::write_bytes(w, &C::to_bytes(&f.public_key)?)?;
                C::write_bytes(w, f.signature.as_bytes())
            }
            Self::AtomicSwap(f) => {
                C::write_bytes(w, &C::to_bytes(&f.condition())?)?;
                let mut fulfillment = Vec::new();
                C::encode(&f.public_key, &mut fulfillment)?;
                C::encode(&f.signature, &mut fulfillment)?;
                C::encode(&f.secret, &mut fulfillment)?;
                C::write_bytes(w, &fulfillment)
            }
        }
    }

    fn read<C: Codec, R: Read + ?Sized>(r: &mut R) -> stakechain_encoding::Result<Self> {
        let unlock_type = UnlockType(C::decode(r)?);
        let condition = C::read_bytes(r, MAX_SLICE_SIZE)?;
        let fulfillment = C::read_bytes(r, MAX_SLICE_SIZE)?;
        match unlock_type {
            UnlockType::PUBLIC_KEY => Ok(Self::SingleSignature(SingleSignatureFulfillment {
                public_key: C::from_bytes(&condition)?,
                signature: ByteSlice(fulfillment),
            })),
            UnlockType::ATOMIC_SWAP => {
                let contract: AtomicSwapCondition = C::from_bytes(&condition)?;
                let mut cursor = fulfillment.as_slice();
                let public_key = C::decode(&mut cursor)?;
                let signature = C::decode(&mut cursor)?;
                let secret = C::decode(&mut cursor)?;
                if !cursor.is_empty() {
                    return Err(EncodingError::TrailingBytes(cursor.len()));
                }
                Ok(Self::AtomicSwap(LegacyAtomicSwapFulfillment {
                    sender: contract.sender,
                    receiver: contract.receiver,
                    hashed_secret: contract.hashed_secret,
                    time_lock: contract.time_lock,
                    public_key,
                    signature,
                    secret,
                }))
            }
            _ => Err(EncodingError::invalid(
                LegacyError::UnsupportedUnlockType.to_string(),
            )),
        }
    }
}

impl TryFrom<&UnlockFulfillment> for LegacyUnlocker {
    type Error = LegacyError;

    fn try_from(fulfillment: &UnlockFulfillment) -> Result<Self, LegacyError> {
        match fulfillment {
            UnlockFulfillment::SingleSignature(f) => Ok(Self::SingleSignature(f.clone())),
            UnlockFulfillment::LegacyAtomicSwap(f) => Ok(Self::AtomicSwap(f.clone())),
            _ => Err(LegacyError::InvalidUnlockType),
        }
    }
}

impl From<LegacyUnlocker> for UnlockFulfillment {
    fn from(unlocker: LegacyUnlocker) -> Self {
        match unlocker {
            LegacyUnlocker::SingleSignature(f) => Self::SingleSignature(f),
            LegacyUnlocker::AtomicSwap(f) => Self::LegacyAtomicSwap(f),
        }
    }
}

impl FixedEncode for LegacyUnlocker {
    fn fixed_encode<W: Write + ?Sized>(&self, w: &mut W) -> stakechain_encoding::Result<()> {
        self.write::<Fixed, _>(w)
    }
}

impl FixedDecode for LegacyUnlocker {
    fn fixed_decode<R: Read + ?Sized>(r: &mut R) -> stakechain_encoding::Result<Self> {
        Self::read::<Fixed, _>(r)
    }
}

impl CompactEncode for LegacyUnlocker {
    fn compact_encode<W: Write + ?Sized>(&self, w: &mut W) -> stakechain_encoding::Result<()> {
        self.write::<Compact, _>(w)
    }
}

impl CompactDecode for LegacyUnlocker {
    fn compact_decode<R: Read + ?Sized>(r: &mut R) -> stakechain_encoding::Result<Self> {
        Self::read::<Compact, _>(r)
    }
}

#[derive(Serialize, Deserialize)]
struct SingleSignatureConditionJson {
    #[serde(rename = "publickey")]
    public_key: PublicKey,
}

#[derive(Serialize, Deserialize)]
struct SingleSignatureFulfillmentJson {
    signature: ByteSlice,
}

#[derive(Deserialize)]
struct RawUnlocker {
    #[serde(rename = "type", default)]
    kind: u8,
    #[serde(default)]
    condition: serde_json::Value,
    #[serde(default)]
    fulfillment: serde_json::Value,
}

impl Serialize for LegacyUnlocker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("type", &self.unlock_type().0)?;
        match self {
            Self::SingleSignature(f) => {
                map.serialize_entry(
                    "condition",
                    &SingleSignatureConditionJson {
                        public_key: f.public_key.clone(),
                    },
                )?;
                map.serialize_entry(
                    "fulfillment",
                    &SingleSignatureFulfillmentJson {
                        signature: f.signature.clone(),
                    },
                )?;
            }
            Self::AtomicSwap(f) => {
                map.serialize_entry("condition", &f.condition())?;
                map.serialize_entry(
                    "fulfillment",
                    &AtomicSwapFulfillment {
                        public_key: f.public_key.clone(),
                        signature: f.signature.clone(),
                        secret: f.secret,
                    },
                )?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LegacyUnlocker {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawUnlocker::deserialize(deserializer)?;
        match UnlockType(raw.kind) {
            UnlockType::PUBLIC_KEY => {
                let condition: SingleSignatureConditionJson =
                    serde_json::from_value(raw.condition).map_err(D::Error::custom)?;
                let fulfillment: SingleSignatureFulfillmentJson =
                    serde_json::from_value(raw.fulfillment).map_err(D::Error::custom)?;
                Ok(Self::SingleSignature(SingleSignatureFulfillment {
                    public_key: condition.public_key,
                    signature: fulfillment.signature,
                }))
            }
            UnlockType::ATOMIC_SWAP => {
                let condition: AtomicSwapCondition =
                    serde_json::from_value(raw.condition).map_err(D::Error::custom)?;
                let fulfillment: AtomicSwapFulfillment =
                    serde_json::from_value(raw.fulfillment).map_err(D::Error::custom)?;
                Ok(Self::AtomicSwap(LegacyAtomicSwapFulfillment {
                    sender: condition.sender,
                    receiver: condition.receiver,
                    hashed_secret: condition.hashed_secret,
                    time_lock: condition.time_lock,
                    public_key: fulfillment.public_key,
                    signature: fulfillment.signature,
                    secret: fulfillment.secret,
                }))
            }
            _ => Err(D::Error::custom(LegacyError::InvalidUnlockType)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyCoinInput {
    #[serde(rename = "parentid")]
    pub parent_id: CoinOutputId,
    pub unlocker: LegacyUnlocker,
}

impl_encoding!(LegacyCoinInput, parent_id, unlocker);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyBlockStakeInput {
    #[serde(rename = "parentid")]
    pub parent_id: BlockStakeOutputId,
    pub unlocker: LegacyUnlocker,
}

impl_encoding!(LegacyBlockStakeInput, parent_id, unlocker);

/// A v0 output, coin or block stake alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyOutput {
    pub value: Currency,
    #[serde(rename = "unlockhash")]
    pub unlock_hash: UnlockHash,
}

impl_encoding!(LegacyOutput, value, unlock_hash);

fn legacy_output(value: &Currency, condition: &UnlockCondition) -> Result<LegacyOutput, LegacyError> {
    match condition {
        UnlockCondition::UnlockHash(c) => Ok(LegacyOutput {
            value: value.clone(),
            unlock_hash: c.target_unlock_hash,
        }),
        _ => Err(LegacyError::UnsupportedCondition),
    }
}

/// Body of a v0 transaction, everything after the version byte.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LegacyTransactionData {
    #[serde(
        rename = "coininputs",
        serialize_with = "nullable",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub coin_inputs: Vec<LegacyCoinInput>,
    #[serde(
        rename = "coinoutputs",
        skip_serializing_if = "Vec::is_empty",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub coin_outputs: Vec<LegacyOutput>,
    #[serde(
        rename = "blockstakeinputs",
        skip_serializing_if = "Vec::is_empty",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub block_stake_inputs: Vec<LegacyBlockStakeInput>,
    #[serde(
        rename = "blockstakeoutputs",
        skip_serializing_if = "Vec::is_empty",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub block_stake_outputs: Vec<LegacyOutput>,
    #[serde(
        rename = "minerfees",
        serialize_with = "nullable",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub miner_fees: Vec<Currency>,
    #[serde(
        rename = "arbitrarydata",
        skip_serializing_if = "Vec::is_empty",
        default,
        with = "base64_bytes"
    )]
    pub arbitrary_data: Vec<u8>,
}

impl_encoding!(
    LegacyTransactionData,
    coin_inputs,
    coin_outputs,
    block_stake_inputs,
    block_stake_outputs,
    miner_fees,
    arbitrary_data
);

impl LegacyTransactionData {
    /// Fails when the transaction uses anything v0 cannot express.
    pub fn from_transaction(tx: &Transaction) -> Result<Self, LegacyError> {
        Ok(Self {
            coin_inputs: tx
                .coin_inputs
                .iter()
                .map(|input| {
                    Ok(LegacyCoinInput {
                        parent_id: input.parent_id,
                        unlocker: LegacyUnlocker::try_from(&input.fulfillment)?,
                    })
                })
                .collect::<Result<_, LegacyError>>()?,
            coin_outputs: tx
                .coin_outputs
                .iter()
                .map(|output| legacy_output(&output.value, &output.condition))
                .collect::<Result<_, _>>()?,
            block_stake_inputs: tx
                .block_stake_inputs
                .iter()
                .map(|input| {
                    Ok(LegacyBlockStakeInput {
                        parent_id: input.parent_id,
                        unlocker: LegacyUnlocker::try_from(&input.fulfillment)?,
                    })
                })
                .collect::<Result<_, LegacyError>>()?,
            block_stake_outputs: tx
                .block_stake_outputs
                .iter()
                .map(|output| legacy_output(&output.value, &output.condition))
                .collect::<Result<_, _>>()?,
            miner_fees: tx.miner_fees.clone(),
            arbitrary_data: tx.arbitrary_data.clone(),
        })
    }

    pub fn into_transaction(self) -> Transaction {
        Transaction {
            version: TransactionVersion::Legacy,
            coin_inputs: self
                .coin_inputs
                .into_iter()
                .map(|input| CoinInput {
                    parent_id: input.parent_id,
                    fulfillment: input.unlocker.into(),
                })
                .collect(),
            coin_outputs: self
                .coin_outputs
                .into_iter()
                .map(|output| CoinOutput {
                    value: output.value,
                    condition: output.unlock_hash.into(),
                })
                .collect(),
            block_stake_inputs: self
                .block_stake_inputs
                .into_iter()
                .map(|input| BlockStakeInput {
                    parent_id: input.parent_id,
                    fulfillment: input.unlocker.into(),
                })
                .collect(),
            block_stake_outputs: self
                .block_stake_outputs
                .into_iter()
                .map(|output| BlockStakeOutput {
                    value: output.value,
                    condition: output.unlock_hash.into(),
                })
                .collect(),
            miner_fees: self.miner_fees,
            arbitrary_data: self.arbitrary_data,
        }
    }
}

/// The unlock hash a v0 input commits to, derived from its fulfillment.
pub fn legacy_fulfillment_unlock_hash(fulfillment: &UnlockFulfillment) -> UnlockHash {
    match fulfillment {
        UnlockFulfillment::SingleSignature(f) => UnlockHash::from_public_key(&f.public_key),
        UnlockFulfillment::LegacyAtomicSwap(f) => f.condition().unlock_hash(),
        other => {
            severe(format!(
                "unexpected fulfillment {:?} in v0 transaction",
                other.fulfillment_type()
            ));
            UnlockHash::NIL
        }
    }
}

/// The bare unlock hash of a v0 output condition.
pub fn legacy_condition_unlock_hash(condition: &UnlockCondition) -> UnlockHash {
    match condition {
        UnlockCondition::UnlockHash(c) => c.target_unlock_hash,
        other => {
            severe(format!(
                "unexpected condition {:?} in v0 transaction",
                other.condition_type()
            ));
            UnlockHash::NIL
        }
    }
}

/// Signature hash of a v0 transaction.
///
/// Inputs are committed to by parent ID and unlock hash (no count prefix),
/// outputs by value and bare unlock hash.
pub fn legacy_signature_hash(tx: &Transaction, extras: &[ExtraObject]) -> Hash {
    let mut hasher = ObjectHasher::new();
    for extra in extras {
        hasher.write(extra);
    }
    for input in &tx.coin_inputs {
        hasher
            .write(&input.parent_id)
            .write(&legacy_fulfillment_unlock_hash(&input.fulfillment));
    }
    hasher.write(&(tx.coin_outputs.len() as u64));
    for output in &tx.coin_outputs {
        hasher
            .write(&output.value)
            .write(&legacy_condition_unlock_hash(&output.condition));
    }
    for input in &tx.block_stake_inputs {
        hasher
            .write(&input.parent_id)
            .write(&legacy_fulfillment_unlock_hash(&input.fulfillment));
    }
    hasher.write(&(tx.block_stake_outputs.len() as u64));
    for output in &tx.block_stake_outputs {
        hasher
            .write(&output.value)
            .write(&legacy_condition_unlock_hash(&output.condition));
    }
    hasher.write(&tx.miner_fees).write(&tx.arbitrary_data);
    hasher.finish()
}
