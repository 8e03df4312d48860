//! Chain constants: the read-only configuration every network is defined by.

use crate::block::{current_timestamp, Block, BlockHeight, Timestamp};
use crate::condition::UnlockCondition;
use crate::currency::Currency;
use crate::difficulty::Difficulty;
use crate::hash::Hash;
use crate::ids::BlockId;
use crate::invariant;
use crate::target::Target;
use crate::transaction::{BlockStakeOutput, CoinOutput, Transaction, TransactionVersion};
use crate::unlockhash::{UnlockHash, UnlockType};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Earliest genesis timestamp accepted by [`ChainConstants::validate`].
pub const MIN_GENESIS_TIMESTAMP: Timestamp = 1231006505;

/// Bytes of a block reserved for everything but a single transaction.
pub const BLOCK_SIZE_RESERVE: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstantsError {
    #[error("invalid genesis coin distribution")]
    EmptyCoinDistribution,
    #[error("invalid genesis block stake allocation")]
    EmptyBlockStakeAllocation,
    #[error("invalid genesis timestamp {0}")]
    GenesisTimestampTooEarly(Timestamp),
    #[error("block size limit {0} leaves no room for transactions")]
    BlockSizeLimitTooSmall(u64),
    #[error("block frequency must be positive")]
    ZeroBlockFrequency,
    #[error("adjustment ratio {0} has a zero term")]
    InvalidRatio(&'static str),
}

pub type Result<T> = std::result::Result<T, ConstantsError>;

/// A non-negative ratio `num / den`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratio {
    pub num: u64,
    pub den: u64,
}

impl Ratio {
    pub const fn new(num: u64, den: u64) -> Self {
        Self { num, den }
    }

    fn is_valid(&self) -> bool {
        self.num != 0 && self.den != 0
    }
}

/// The subset of the chain constants standalone transaction validation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionValidationConstants {
    pub block_size_limit: u64,
    pub arbitrary_data_size_limit: u64,
    pub minimum_miner_fee: Currency,
}

impl Default for TransactionValidationConstants {
    fn default() -> Self {
        ChainConstants::standard().transaction_validation_constants()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConstants {
    /// Maximum size of an encoded block, in bytes.
    pub block_size_limit: u64,
    pub arbitrary_data_size_limit: u64,
    /// Largest possible target; a zero target has this difficulty.
    pub root_depth: Target,
    /// Targeted seconds between blocks.
    pub block_frequency: BlockHeight,
    /// Blocks before a payout can be spent.
    pub maturity_delay: BlockHeight,
    pub median_timestamp_window: u64,
    pub target_window: BlockHeight,
    pub max_adjustment_up: Ratio,
    pub max_adjustment_down: Ratio,
    /// Seconds a block may be ahead of local time before it is held back.
    pub future_threshold: Timestamp,
    /// Seconds a block may be ahead of local time before it is rejected.
    pub extreme_future_threshold: Timestamp,
    pub stake_modifier_delay: BlockHeight,
    pub block_stake_aging: u64,
    pub block_creator_fee: Currency,
    pub minimum_transaction_fee: Currency,
    /// Base units in one coin.
    pub one_coin: Currency,
    pub genesis_timestamp: Timestamp,
    pub genesis_block_stake_allocation: Vec<BlockStakeOutput>,
    pub genesis_coin_distribution: Vec<CoinOutput>,
    pub genesis_transaction_version: TransactionVersion,
    pub default_transaction_version: TransactionVersion,
}

impl Default for ChainConstants {
    fn default() -> Self {
        Self::standard()
    }
}

fn one_coin() -> Currency {
    Currency::from(1_000_000_000)
}

fn address(s: &str) -> UnlockCondition {
    match s.parse::<UnlockHash>() {
        Ok(uh) => uh.into(),
        Err(err) => invariant::critical(format!("invalid genesis address {}: {}", s, err)),
    }
}

fn public_key_hash(bytes: [u8; 32]) -> UnlockCondition {
    UnlockHash::new(UnlockType::PUBLIC_KEY, Hash(bytes)).into()
}

impl ChainConstants {
    /// The production network.
    pub fn standard() -> Self {
        let coin = one_coin();
        let owner = "01b5e42056ef394f2ad9b511a61cec874d25bebe2095682dd37455cbafed4bec154e382a23f90e";
        Self {
            block_size_limit: 2_000_000,
            arbitrary_data_size_limit: 83,
            root_depth: Target::MAX,
            block_frequency: 600,
            maturity_delay: 144,
            median_timestamp_window: 11,
            target_window: 1000,
            max_adjustment_up: Ratio::new(25, 10),
            max_adjustment_down: Ratio::new(10, 25),
            future_threshold: 3 * 60 * 60,
            extreme_future_threshold: 5 * 60 * 60,
            stake_modifier_delay: 2000,
            // 2^16s < 1 day < 2^17s
            block_stake_aging: 1 << 17,
            block_creator_fee: &coin * 10,
            minimum_transaction_fee: coin.clone(),
            genesis_timestamp: 1496322000,
            genesis_block_stake_allocation: vec![BlockStakeOutput {
                value: Currency::from(1_000_000),
                condition: address(owner),
            }],
            genesis_coin_distribution: vec![CoinOutput {
                value: &coin * 100_000_000,
                condition: address(owner),
            }],
            genesis_transaction_version: TransactionVersion::One,
            default_transaction_version: TransactionVersion::One,
            one_coin: coin,
        }
    }

    /// A fast public test network whose genesis lies a little in the past.
    pub fn testnet() -> Self {
        let coin = one_coin();
        let first = [
            214, 166, 197, 164, 29, 201, 53, 236, 106, 239, 10, 158, 127, 131, 20, 138, 63, 221,
            230, 16, 98, 247, 32, 77, 210, 68, 116, 12, 241, 89, 27, 223,
        ];
        let second = [
            209, 246, 228, 60, 248, 78, 242, 110, 9, 8, 227, 248, 225, 216, 163, 52, 142, 93, 47,
            176, 103, 41, 137, 80, 212, 8, 132, 58, 241, 189, 2, 17,
        ];
        Self {
            block_size_limit: 2_000_000,
            arbitrary_data_size_limit: 83,
            root_depth: Target::MAX,
            block_frequency: 1,
            maturity_delay: 3,
            median_timestamp_window: 11,
            target_window: 200,
            max_adjustment_up: Ratio::new(10001, 10000),
            max_adjustment_down: Ratio::new(9999, 10000),
            future_threshold: 3,
            extreme_future_threshold: 6,
            stake_modifier_delay: 20,
            block_stake_aging: 1 << 10,
            block_creator_fee: &coin * 100,
            minimum_transaction_fee: coin.clone(),
            genesis_timestamp: current_timestamp().saturating_sub(1_000_000),
            genesis_block_stake_allocation: vec![
                BlockStakeOutput {
                    value: Currency::from(2000),
                    condition: public_key_hash(first),
                },
                BlockStakeOutput {
                    value: Currency::from(7000),
                    condition: public_key_hash(second),
                },
                BlockStakeOutput {
                    value: Currency::from(1000),
                    condition: UnlockCondition::Nil,
                },
            ],
            genesis_coin_distribution: vec![CoinOutput {
                value: &coin * 1000,
                condition: public_key_hash(first),
            }],
            genesis_transaction_version: TransactionVersion::One,
            default_transaction_version: TransactionVersion::One,
            one_coin: coin,
        }
    }

    /// A local development network.
    pub fn devnet() -> Self {
        let coin = one_coin();
        let owner = "015a080a9259b9d4aaa550e2156f49b1a79a64c7ea463d810d4493e8242e6791584fbdac553e6f";
        Self {
            block_size_limit: 2_000_000,
            arbitrary_data_size_limit: 83,
            root_depth: Target::MAX,
            block_frequency: 12,
            maturity_delay: 10,
            median_timestamp_window: 11,
            target_window: 20,
            max_adjustment_up: Ratio::new(120, 100),
            max_adjustment_down: Ratio::new(100, 120),
            future_threshold: 2 * 60,
            extreme_future_threshold: 4 * 60,
            stake_modifier_delay: 2000,
            block_stake_aging: 1 << 10,
            block_creator_fee: &coin * 10,
            minimum_transaction_fee: coin.clone(),
            genesis_timestamp: 1424139000,
            genesis_block_stake_allocation: vec![BlockStakeOutput {
                value: Currency::from(1_000_000),
                condition: address(owner),
            }],
            genesis_coin_distribution: vec![CoinOutput {
                value: &coin * 1000,
                condition: address(owner),
            }],
            genesis_transaction_version: TransactionVersion::One,
            default_transaction_version: TransactionVersion::One,
            one_coin: coin,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.genesis_coin_distribution.is_empty() {
            return Err(ConstantsError::EmptyCoinDistribution);
        }
        if self.genesis_block_stake_allocation.is_empty() {
            return Err(ConstantsError::EmptyBlockStakeAllocation);
        }
        if self.genesis_timestamp < MIN_GENESIS_TIMESTAMP {
            return Err(ConstantsError::GenesisTimestampTooEarly(self.genesis_timestamp));
        }
        if self.block_size_limit <= BLOCK_SIZE_RESERVE {
            return Err(ConstantsError::BlockSizeLimitTooSmall(self.block_size_limit));
        }
        if self.block_frequency == 0 {
            return Err(ConstantsError::ZeroBlockFrequency);
        }
        if !self.max_adjustment_up.is_valid() {
            return Err(ConstantsError::InvalidRatio("up"));
        }
        if !self.max_adjustment_down.is_valid() {
            return Err(ConstantsError::InvalidRatio("down"));
        }
        Ok(())
    }

    pub fn transaction_validation_constants(&self) -> TransactionValidationConstants {
        TransactionValidationConstants {
            block_size_limit: self.block_size_limit,
            arbitrary_data_size_limit: self.arbitrary_data_size_limit,
            minimum_miner_fee: self.minimum_transaction_fee.clone(),
        }
    }

    /// The block every chain on this network starts from.
    pub fn genesis_block(&self) -> Block {
        Block {
            timestamp: self.genesis_timestamp,
            transactions: vec![Transaction {
                version: self.genesis_transaction_version,
                block_stake_outputs: self.genesis_block_stake_allocation.clone(),
                coin_outputs: self.genesis_coin_distribution.clone(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    pub fn genesis_block_id(&self) -> BlockId {
        self.genesis_block().id()
    }

    pub fn genesis_block_stake_count(&self) -> Currency {
        self.genesis_block_stake_allocation
            .iter()
            .map(|output| &output.value)
            .sum()
    }

    pub fn genesis_coin_count(&self) -> Currency {
        self.genesis_coin_distribution
            .iter()
            .map(|output| &output.value)
            .sum()
    }

    /// Block frequency times the genesis block stake count, at least 1.
    pub fn start_difficulty(&self) -> Difficulty {
        let stakes = BigUint::from(self.block_frequency) * self.genesis_block_stake_count().big();
        if stakes.bits() == 0 {
            return Difficulty::from(1);
        }
        Difficulty::from_big(stakes)
    }

    pub fn root_target(&self) -> Target {
        Target::from_difficulty(&self.start_difficulty(), &self.root_depth)
    }
}
