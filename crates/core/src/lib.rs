//! Core protocol types for stakechain.
//!
//! This crate provides every consensus-critical structure of the chain:
//! - Hashing, typed identifiers and Merkle roots
//! - Currency, difficulty and target arithmetic
//! - Unlock conditions and their fulfillments
//! - Transactions, their signature hashes and the legacy (v0) bridge
//! - Blocks, block headers and chain constants
//!
//! Every wire type implements both binary codecs of `stakechain-encoding`
//! as well as serde JSON.

pub mod block;
pub mod condition;
pub mod constants;
pub mod covered_fields;
pub mod crypto;
pub mod currency;
pub mod difficulty;
pub mod fulfillment;
pub mod hash;
pub mod ids;
pub mod invariant;
mod json;
pub mod legacy;
pub mod merkle;
pub mod signing;
pub mod target;
pub mod transaction;
pub mod unlockhash;

// Re-export commonly used types at the crate root
pub use block::{
    current_timestamp, Block, BlockHeader, BlockHeight, BlockStakeOutputIndexes, MinerPayout,
    Timestamp,
};
pub use condition::{
    AtomicSwapCondition, ConditionError, ConditionType, MultiSignatureCondition,
    TimeLockCondition, UnlockCondition, UnlockHashCondition,
};
pub use constants::{ChainConstants, ConstantsError, TransactionValidationConstants};
pub use covered_fields::{CoveredFields, CoveredFieldsError};
pub use crypto::{ByteSlice, CryptoError, KeyPair, PublicKey, SignatureAlgoType};
pub use currency::{Currency, CurrencyError};
pub use difficulty::Difficulty;
pub use fulfillment::{
    AtomicSwapFulfillment, FulfillmentError, FulfillmentType, LegacyAtomicSwapFulfillment,
    MultiSignatureFulfillment, SingleSignatureFulfillment, UnlockFulfillment,
};
pub use hash::{hash, hash_concat, hash_object, Hash, ObjectHasher};
pub use ids::{BlockId, BlockStakeOutputId, CoinOutputId, Specifier, TransactionId};
pub use legacy::{LegacyError, LegacyTransactionData};
pub use merkle::{merkle_root, MerkleTree};
pub use signing::{ExtraObject, FulfillContext, FulfillableContext, SignContext};
pub use target::Target;
pub use transaction::{
    BlockStakeInput, BlockStakeOutput, CoinInput, CoinOutput, Transaction, TransactionError,
    TransactionVersion,
};
pub use unlockhash::{UnlockHash, UnlockHashError, UnlockType};
