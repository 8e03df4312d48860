//! Transactions: inputs spending earlier outputs, new outputs, and fees.
//!
//! Two versions exist. Version 1 is the default. Version 0 is the launch
//! format, whose byte layout is frozen; it is bridged to and from the
//! in-memory model by [`crate::legacy`].

use crate::condition::UnlockCondition;
use crate::crypto::KeyPair;
use crate::currency::Currency;
use crate::fulfillment::{FulfillmentError, UnlockFulfillment};
use crate::hash::{Hash, ObjectHasher};
use crate::ids::{
    BlockStakeOutputId, CoinOutputId, Specifier, TransactionId, SPECIFIER_BLOCK_STAKE_OUTPUT,
    SPECIFIER_COIN_OUTPUT,
};
use crate::invariant::critical;
use crate::json::{base64_bytes, null_as_empty, nullable};
use crate::legacy::{legacy_signature_hash, LegacyError, LegacyTransactionData};
use crate::signing::{ExtraObject, SignContext};
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use stakechain_encoding::{
    impl_encoding, read_fixed_bytes, write_fixed_bytes, Codec, Compact, CompactDecode,
    CompactEncode, EncodingError, Fixed, FixedDecode, FixedEncode, MAX_SLICE_SIZE,
};
use std::io::{Read, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("unknown transaction version {0}")]
    UnknownVersion(u8),
    #[error("{kind} input index {index} out of range")]
    InputOutOfRange { kind: &'static str, index: usize },
    #[error(transparent)]
    Legacy(#[from] LegacyError),
    #[error(transparent)]
    Fulfillment(#[from] FulfillmentError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

pub type Result<T> = std::result::Result<T, TransactionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[repr(u8)]
pub enum TransactionVersion {
    /// The frozen launch format.
    Legacy = 0,
    #[default]
    One = 1,
}

impl TransactionVersion {
    pub fn from_u8(version: u8) -> Option<Self> {
        match version {
            0 => Some(Self::Legacy),
            1 => Some(Self::One),
            _ => None,
        }
    }
}

impl TryFrom<u8> for TransactionVersion {
    type Error = TransactionError;

    fn try_from(version: u8) -> Result<Self> {
        Self::from_u8(version).ok_or(TransactionError::UnknownVersion(version))
    }
}

impl Serialize for TransactionVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for TransactionVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let version = u8::deserialize(deserializer)?;
        Self::from_u8(version)
            .ok_or_else(|| D::Error::custom(TransactionError::UnknownVersion(version)))
    }
}

fn read_version(tag: u8) -> stakechain_encoding::Result<TransactionVersion> {
    TransactionVersion::from_u8(tag).ok_or(EncodingError::UnknownTag {
        kind: "transaction version",
        tag,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoinInput {
    #[serde(rename = "parentid")]
    pub parent_id: CoinOutputId,
    pub fulfillment: UnlockFulfillment,
}

impl_encoding!(CoinInput, parent_id, fulfillment);

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoinOutput {
    pub value: Currency,
    pub condition: UnlockCondition,
}

impl_encoding!(CoinOutput, value, condition);

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockStakeInput {
    #[serde(rename = "parentid")]
    pub parent_id: BlockStakeOutputId,
    pub fulfillment: UnlockFulfillment,
}

impl_encoding!(BlockStakeInput, parent_id, fulfillment);

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockStakeOutput {
    pub value: Currency,
    pub condition: UnlockCondition,
}

impl_encoding!(BlockStakeOutput, value, condition);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transaction {
    pub version: TransactionVersion,
    pub coin_inputs: Vec<CoinInput>,
    pub coin_outputs: Vec<CoinOutput>,
    pub block_stake_inputs: Vec<BlockStakeInput>,
    pub block_stake_outputs: Vec<BlockStakeOutput>,
    pub miner_fees: Vec<Currency>,
    pub arbitrary_data: Vec<u8>,
}

impl Transaction {
    /// The v0 shape of this transaction.
    pub fn legacy_data(&self) -> std::result::Result<LegacyTransactionData, LegacyError> {
        LegacyTransactionData::from_transaction(self)
    }

    // v0 identifies by its legacy data (no version byte), v1 by its full encoding.
    fn write_id_input(&self, hasher: &mut ObjectHasher) {
        match self.version {
            TransactionVersion::Legacy => match self.legacy_data() {
                Ok(data) => {
                    hasher.write(&data);
                }
                Err(err) => critical(format!("v0 transaction cannot be identified: {}", err)),
            },
            TransactionVersion::One => {
                hasher.write(self);
            }
        }
    }

    pub fn id(&self) -> TransactionId {
        let mut hasher = ObjectHasher::new();
        self.write_id_input(&mut hasher);
        TransactionId(hasher.finish())
    }

    fn output_id(&self, specifier: &Specifier, index: u64) -> Hash {
        let mut hasher = ObjectHasher::new();
        hasher.write(specifier);
        self.write_id_input(&mut hasher);
        hasher.write(&index);
        hasher.finish()
    }

    /// ID of the coin output at `index`.
    pub fn coin_output_id(&self, index: u64) -> CoinOutputId {
        CoinOutputId(self.output_id(&SPECIFIER_COIN_OUTPUT, index))
    }

    /// ID of the block stake output at `index`.
    pub fn block_stake_output_id(&self, index: u64) -> BlockStakeOutputId {
        BlockStakeOutputId(self.output_id(&SPECIFIER_BLOCK_STAKE_OUTPUT, index))
    }

    /// The hash an input's signature commits to.
    ///
    /// `extras` starts with the input index; fulfillments append their own
    /// objects. Fulfillments themselves are never covered, so inputs can be
    /// signed in any order.
    pub fn signature_hash(&self, extras: &[ExtraObject]) -> Hash {
        if self.version == TransactionVersion::Legacy {
            return legacy_signature_hash(self, extras);
        }
        let mut hasher = ObjectHasher::new();
        hasher.write(&(self.version as u8));
        for extra in extras {
            hasher.write(extra);
        }
        hasher.write(&(self.coin_inputs.len() as u64));
        for input in &self.coin_inputs {
            hasher.write(&input.parent_id);
        }
        hasher.write(&self.coin_outputs);
        hasher.write(&(self.block_stake_inputs.len() as u64));
        for input in &self.block_stake_inputs {
            hasher.write(&input.parent_id);
        }
        hasher
            .write(&self.block_stake_outputs)
            .write(&self.miner_fees)
            .write(&self.arbitrary_data);
        hasher.finish()
    }

    /// Sign the fulfillment of the coin input at `index` with `key`.
    pub fn sign_coin_input(&mut self, index: usize, key: &KeyPair) -> Result<()> {
        let mut fulfillment = self
            .coin_inputs
            .get(index)
            .ok_or(TransactionError::InputOutOfRange {
                kind: "coin",
                index,
            })?
            .fulfillment
            .clone();
        fulfillment.sign(&SignContext {
            input_index: index as u64,
            transaction: self,
            key,
        })?;
        self.coin_inputs[index].fulfillment = fulfillment;
        Ok(())
    }

    /// Sign the fulfillment of the block stake input at `index` with `key`.
    pub fn sign_block_stake_input(&mut self, index: usize, key: &KeyPair) -> Result<()> {
        let mut fulfillment = self
            .block_stake_inputs
            .get(index)
            .ok_or(TransactionError::InputOutOfRange {
                kind: "block stake",
                index,
            })?
            .fulfillment
            .clone();
        fulfillment.sign(&SignContext {
            input_index: index as u64,
            transaction: self,
            key,
        })?;
        self.block_stake_inputs[index].fulfillment = fulfillment;
        Ok(())
    }

    pub fn miner_fee_sum(&self) -> Currency {
        self.miner_fees.iter().sum()
    }

    /// Sum of all coin outputs and miner fees.
    pub fn coin_output_sum(&self) -> Currency {
        self.coin_outputs
            .iter()
            .map(|output| &output.value)
            .chain(self.miner_fees.iter())
            .sum()
    }

    fn write_data<C: Codec, W: Write + ?Sized>(&self, w: &mut W) -> stakechain_encoding::Result<()> {
        C::encode(&self.coin_inputs, w)?;
        C::encode(&self.coin_outputs, w)?;
        C::encode(&self.block_stake_inputs, w)?;
        C::encode(&self.block_stake_outputs, w)?;
        C::encode(&self.miner_fees, w)?;
        C::encode(&self.arbitrary_data, w)
    }

    fn read_data<C: Codec, R: Read + ?Sized>(r: &mut R) -> stakechain_encoding::Result<Self> {
        Ok(Self {
            version: TransactionVersion::One,
            coin_inputs: C::decode(r)?,
            coin_outputs: C::decode(r)?,
            block_stake_inputs: C::decode(r)?,
            block_stake_outputs: C::decode(r)?,
            miner_fees: C::decode(r)?,
            arbitrary_data: C::decode(r)?,
        })
    }

    fn encoding_legacy_data(&self) -> stakechain_encoding::Result<LegacyTransactionData> {
        self.legacy_data()
            .map_err(|err| EncodingError::invalid(err.to_string()))
    }
}

impl FixedEncode for Transaction {
    fn fixed_encode<W: Write + ?Sized>(&self, w: &mut W) -> stakechain_encoding::Result<()> {
        (self.version as u8).fixed_encode(w)?;
        match self.version {
            TransactionVersion::Legacy => self.encoding_legacy_data()?.fixed_encode(w),
            // v1 data is wrapped in a byte slice so unknown versions can be skipped
            TransactionVersion::One => {
                let mut data = Vec::new();
                self.write_data::<Fixed, _>(&mut data)?;
                write_fixed_bytes(w, &data)
            }
        }
    }
}

impl FixedDecode for Transaction {
    fn fixed_decode<R: Read + ?Sized>(r: &mut R) -> stakechain_encoding::Result<Self> {
        match read_version(u8::fixed_decode(r)?)? {
            TransactionVersion::Legacy => {
                Ok(LegacyTransactionData::fixed_decode(r)?.into_transaction())
            }
            TransactionVersion::One => {
                let data = read_fixed_bytes(r, MAX_SLICE_SIZE)?;
                let mut cursor = data.as_slice();
                let transaction = Self::read_data::<Fixed, _>(&mut cursor)?;
                if !cursor.is_empty() {
                    return Err(EncodingError::TrailingBytes(cursor.len()));
                }
                Ok(transaction)
            }
        }
    }
}

impl CompactEncode for Transaction {
    fn compact_encode<W: Write + ?Sized>(&self, w: &mut W) -> stakechain_encoding::Result<()> {
        (self.version as u8).compact_encode(w)?;
        match self.version {
            TransactionVersion::Legacy => self.encoding_legacy_data()?.compact_encode(w),
            TransactionVersion::One => self.write_data::<Compact, _>(w),
        }
    }
}

impl CompactDecode for Transaction {
    fn compact_decode<R: Read + ?Sized>(r: &mut R) -> stakechain_encoding::Result<Self> {
        match read_version(u8::compact_decode(r)?)? {
            TransactionVersion::Legacy => {
                Ok(LegacyTransactionData::compact_decode(r)?.into_transaction())
            }
            TransactionVersion::One => Self::read_data::<Compact, _>(r),
        }
    }
}

#[derive(Serialize)]
struct TransactionDataRef<'a> {
    #[serde(rename = "coininputs", serialize_with = "nullable")]
    coin_inputs: &'a [CoinInput],
    #[serde(rename = "coinoutputs", skip_serializing_if = "<[_]>::is_empty")]
    coin_outputs: &'a [CoinOutput],
    #[serde(rename = "blockstakeinputs", skip_serializing_if = "<[_]>::is_empty")]
    block_stake_inputs: &'a [BlockStakeInput],
    #[serde(rename = "blockstakeoutputs", skip_serializing_if = "<[_]>::is_empty")]
    block_stake_outputs: &'a [BlockStakeOutput],
    #[serde(rename = "minerfees", serialize_with = "nullable")]
    miner_fees: &'a [Currency],
    #[serde(
        rename = "arbitrarydata",
        skip_serializing_if = "<[_]>::is_empty",
        with = "base64_bytes"
    )]
    arbitrary_data: &'a [u8],
}

#[derive(Deserialize)]
struct TransactionData {
    #[serde(rename = "coininputs", default, deserialize_with = "null_as_empty")]
    coin_inputs: Vec<CoinInput>,
    #[serde(rename = "coinoutputs", default, deserialize_with = "null_as_empty")]
    coin_outputs: Vec<CoinOutput>,
    #[serde(rename = "blockstakeinputs", default, deserialize_with = "null_as_empty")]
    block_stake_inputs: Vec<BlockStakeInput>,
    #[serde(rename = "blockstakeoutputs", default, deserialize_with = "null_as_empty")]
    block_stake_outputs: Vec<BlockStakeOutput>,
    #[serde(rename = "minerfees", default, deserialize_with = "null_as_empty")]
    miner_fees: Vec<Currency>,
    #[serde(
        rename = "arbitrarydata",
        default,
        deserialize_with = "base64_bytes::deserialize"
    )]
    arbitrary_data: Vec<u8>,
}

#[derive(Serialize)]
struct VersionedRef<'a, T> {
    version: TransactionVersion,
    data: &'a T,
}

#[derive(Deserialize)]
struct Versioned {
    version: TransactionVersion,
    #[serde(default)]
    data: serde_json::Value,
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.version {
            TransactionVersion::Legacy => {
                let data = self.legacy_data().map_err(S::Error::custom)?;
                VersionedRef {
                    version: self.version,
                    data: &data,
                }
                .serialize(serializer)
            }
            TransactionVersion::One => VersionedRef {
                version: self.version,
                data: &TransactionDataRef {
                    coin_inputs: &self.coin_inputs,
                    coin_outputs: &self.coin_outputs,
                    block_stake_inputs: &self.block_stake_inputs,
                    block_stake_outputs: &self.block_stake_outputs,
                    miner_fees: &self.miner_fees,
                    arbitrary_data: &self.arbitrary_data,
                },
            }
            .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Transaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Versioned::deserialize(deserializer)?;
        match raw.version {
            TransactionVersion::Legacy => {
                let data: LegacyTransactionData =
                    serde_json::from_value(raw.data).map_err(D::Error::custom)?;
                Ok(data.into_transaction())
            }
            TransactionVersion::One => {
                let data: TransactionData =
                    serde_json::from_value(raw.data).map_err(D::Error::custom)?;
                Ok(Self {
                    version: TransactionVersion::One,
                    coin_inputs: data.coin_inputs,
                    coin_outputs: data.coin_outputs,
                    block_stake_inputs: data.block_stake_inputs,
                    block_stake_outputs: data.block_stake_outputs,
                    miner_fees: data.miner_fees,
                    arbitrary_data: data.arbitrary_data,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{MultiSignatureCondition, TimeLockCondition};
    use crate::fulfillment::{MultiSignatureFulfillment, SingleSignatureFulfillment};
    use crate::hash::hash;
    use crate::signing::FulfillContext;
    use crate::unlockhash::UnlockHash;
    use stakechain_encoding::{from_compact_bytes, from_fixed_bytes, to_compact_bytes, to_fixed_bytes};

    fn single_signature_input(key: &KeyPair, parent: &[u8]) -> CoinInput {
        CoinInput {
            parent_id: CoinOutputId(hash(parent)),
            fulfillment: UnlockFulfillment::SingleSignature(SingleSignatureFulfillment::new(
                key.public_key.clone(),
            )),
        }
    }

    fn output(value: u64, owner: &KeyPair) -> CoinOutput {
        CoinOutput {
            value: Currency::from(value),
            condition: UnlockHash::from_public_key(&owner.public_key).into(),
        }
    }

    fn ctx(tx: &Transaction, index: u64) -> FulfillContext<'_> {
        FulfillContext {
            input_index: index,
            block_height: 10,
            block_time: 1_600_000_000,
            transaction: tx,
        }
    }

    #[test]
    fn test_default_is_v1() {
        let tx = Transaction::default();
        assert_eq!(tx.version, TransactionVersion::One);
        assert!(matches!(
            TransactionVersion::try_from(2),
            Err(TransactionError::UnknownVersion(2))
        ));
    }

    #[test]
    fn test_empty_v1_layouts() {
        let tx = Transaction::default();
        let fixed = to_fixed_bytes(&tx);
        let mut expected = vec![1u8];
        expected.extend_from_slice(&48u64.to_le_bytes());
        expected.extend_from_slice(&[0u8; 48]);
        assert_eq!(fixed, expected);
        assert_eq!(to_compact_bytes(&tx).unwrap(), vec![1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(from_fixed_bytes::<Transaction>(&fixed).unwrap(), tx);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut bytes = to_fixed_bytes(&Transaction::default());
        bytes[0] = 2;
        assert!(matches!(
            from_fixed_bytes::<Transaction>(&bytes),
            Err(EncodingError::UnknownTag { tag: 2, .. })
        ));
        assert!(serde_json::from_str::<Transaction>(r#"{"version":7,"data":{}}"#).is_err());
    }

    #[test]
    fn test_v1_round_trips() {
        let alice = KeyPair::from_secret_key(&[1; 32]);
        let bob = KeyPair::from_secret_key(&[2; 32]);
        let tx = Transaction {
            coin_inputs: vec![single_signature_input(&alice, b"parent")],
            coin_outputs: vec![output(40, &bob), output(9, &alice)],
            block_stake_outputs: vec![BlockStakeOutput {
                value: Currency::from(3),
                condition: UnlockCondition::TimeLock(TimeLockCondition::new(
                    500,
                    UnlockHash::from_public_key(&bob.public_key).into(),
                )),
            }],
            miner_fees: vec![Currency::from(1)],
            arbitrary_data: b"42".to_vec(),
            ..Default::default()
        };
        let fixed = to_fixed_bytes(&tx);
        assert_eq!(from_fixed_bytes::<Transaction>(&fixed).unwrap(), tx);
        let compact = to_compact_bytes(&tx).unwrap();
        assert!(compact.len() < fixed.len());
        assert_eq!(from_compact_bytes::<Transaction>(&compact).unwrap(), tx);
        let json = serde_json::to_string(&tx).unwrap();
        assert_eq!(serde_json::from_str::<Transaction>(&json).unwrap(), tx);
    }

    #[test]
    fn test_v1_json_shape() {
        let json = serde_json::to_string(&Transaction::default()).unwrap();
        assert_eq!(json, r#"{"version":1,"data":{"coininputs":null,"minerfees":null}}"#);

        let tx = Transaction {
            miner_fees: vec![Currency::from(1)],
            arbitrary_data: b"42".to_vec(),
            ..Default::default()
        };
        let json = serde_json::to_string(&tx).unwrap();
        assert_eq!(
            json,
            r#"{"version":1,"data":{"coininputs":null,"minerfees":["1"],"arbitrarydata":"NDI="}}"#
        );
    }

    #[test]
    fn test_arbitrary_data_json_is_base64() {
        let json = r#"{"version":1,"data":{"coininputs":null,"minerfees":["1"],"arbitrarydata":"ZGF0YQ=="}}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.arbitrary_data, b"data".to_vec());
        assert_eq!(serde_json::to_string(&tx).unwrap(), json);

        let legacy = r#"{
            "version": 0,
            "data": {
                "coininputs": [
                    {
                        "parentid": "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef",
                        "unlocker": {
                            "type": 1,
                            "condition": {
                                "publickey": "ed25519:def123def123def123def123def123def123def123def123def123def123def1"
                            },
                            "fulfillment": {
                                "signature": "ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef12345ef"
                            }
                        }
                    }
                ],
                "minerfees": ["1"],
                "arbitrarydata": "SGVsbG8sIFdvcmxkIQ=="
            }
        }"#;
        let tx: Transaction = serde_json::from_str(legacy).unwrap();
        assert_eq!(tx.version, TransactionVersion::Legacy);
        assert_eq!(tx.arbitrary_data, b"Hello, World!".to_vec());
        let expected: serde_json::Value = serde_json::from_str(legacy).unwrap();
        assert_eq!(serde_json::to_value(&tx).unwrap(), expected);

        let hex_data = r#"{"version":1,"data":{"coininputs":null,"minerfees":null,"arbitrarydata":"64617461"}}"#;
        assert_ne!(
            serde_json::from_str::<Transaction>(hex_data).map(|tx| tx.arbitrary_data).ok(),
            Some(b"data".to_vec())
        );
    }

    #[test]
    fn test_ids_differ() {
        let alice = KeyPair::from_secret_key(&[1; 32]);
        let tx = Transaction {
            coin_outputs: vec![output(1, &alice)],
            ..Default::default()
        };
        let id = tx.id();
        assert_eq!(id.0, hash(&to_fixed_bytes(&tx)));
        assert_ne!(tx.coin_output_id(0).0, tx.coin_output_id(1).0);
        assert_ne!(tx.coin_output_id(0).0, tx.block_stake_output_id(0).0);
        assert_ne!(tx.coin_output_id(0).0, id.0);
    }

    #[test]
    fn test_signature_hash_commits_to_extras_not_fulfillments() {
        let alice = KeyPair::from_secret_key(&[1; 32]);
        let mut tx = Transaction {
            coin_inputs: vec![
                single_signature_input(&alice, b"a"),
                single_signature_input(&alice, b"b"),
            ],
            ..Default::default()
        };
        let h0 = tx.signature_hash(&[ExtraObject::InputIndex(0)]);
        let h1 = tx.signature_hash(&[ExtraObject::InputIndex(1)]);
        assert_ne!(h0, h1);
        tx.sign_coin_input(0, &alice).unwrap();
        assert_eq!(tx.signature_hash(&[ExtraObject::InputIndex(0)]), h0);
        tx.miner_fees.push(Currency::from(1));
        assert_ne!(tx.signature_hash(&[ExtraObject::InputIndex(0)]), h0);
    }

    #[test]
    fn test_sign_and_fulfill() {
        let alice = KeyPair::from_secret_key(&[1; 32]);
        let bob = KeyPair::from_secret_key(&[2; 32]);
        let mut tx = Transaction {
            coin_inputs: vec![
                single_signature_input(&alice, b"a"),
                single_signature_input(&alice, b"b"),
            ],
            coin_outputs: vec![output(10, &bob)],
            miner_fees: vec![Currency::from(1)],
            ..Default::default()
        };
        tx.sign_coin_input(0, &alice).unwrap();
        tx.sign_coin_input(1, &alice).unwrap();

        let condition: UnlockCondition = UnlockHash::from_public_key(&alice.public_key).into();
        for index in 0..2 {
            let f = &tx.coin_inputs[index].fulfillment;
            assert!(condition.fulfill(f, &ctx(&tx, index as u64)).is_ok());
        }
        // a signature for input 0 does not verify as input 1
        let f0 = tx.coin_inputs[0].fulfillment.clone();
        assert!(matches!(
            condition.fulfill(&f0, &ctx(&tx, 1)),
            Err(FulfillmentError::Crypto(_))
        ));

        assert!(matches!(
            tx.sign_coin_input(0, &alice),
            Err(TransactionError::Fulfillment(FulfillmentError::AlreadySigned))
        ));
        assert!(matches!(
            tx.sign_coin_input(5, &alice),
            Err(TransactionError::InputOutOfRange { index: 5, .. })
        ));
    }

    #[test]
    fn test_sign_with_wrong_key() {
        let alice = KeyPair::from_secret_key(&[1; 32]);
        let bob = KeyPair::from_secret_key(&[2; 32]);
        let mut tx = Transaction {
            coin_inputs: vec![single_signature_input(&alice, b"a")],
            ..Default::default()
        };
        assert!(matches!(
            tx.sign_coin_input(0, &bob),
            Err(TransactionError::Fulfillment(FulfillmentError::SigningKeyMismatch))
        ));
    }

    #[test]
    fn test_multisig_block_stake_input() {
        let keys: Vec<KeyPair> = (1..=3).map(|i| KeyPair::from_secret_key(&[i; 32])).collect();
        let condition = UnlockCondition::MultiSignature(MultiSignatureCondition::new(
            keys.iter()
                .map(|k| UnlockHash::from_public_key(&k.public_key))
                .collect(),
            2,
        ));
        let mut tx = Transaction {
            block_stake_inputs: vec![BlockStakeInput {
                parent_id: BlockStakeOutputId(hash(b"stake")),
                fulfillment: UnlockFulfillment::MultiSignature(MultiSignatureFulfillment::new()),
            }],
            ..Default::default()
        };
        tx.sign_block_stake_input(0, &keys[0]).unwrap();
        assert_eq!(
            condition.fulfill(&tx.block_stake_inputs[0].fulfillment, &ctx(&tx, 0)),
            Err(FulfillmentError::InsufficientSignatures)
        );
        tx.sign_block_stake_input(0, &keys[2]).unwrap();
        assert!(condition
            .fulfill(&tx.block_stake_inputs[0].fulfillment, &ctx(&tx, 0))
            .is_ok());
    }

    #[test]
    fn test_output_sums() {
        let alice = KeyPair::from_secret_key(&[1; 32]);
        let tx = Transaction {
            coin_outputs: vec![output(10, &alice), output(5, &alice)],
            miner_fees: vec![Currency::from(1), Currency::from(2)],
            ..Default::default()
        };
        assert_eq!(tx.miner_fee_sum(), Currency::from(3));
        assert_eq!(tx.coin_output_sum(), Currency::from(18));
    }
}
