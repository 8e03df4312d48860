//! Block and block header structures.

use crate::currency::Currency;
use crate::hash::{hash_object, Hash, ObjectHasher};
use crate::ids::{BlockId, CoinOutputId};
use crate::merkle::MerkleTree;
use crate::transaction::Transaction;
use crate::unlockhash::UnlockHash;
use serde::{Deserialize, Serialize};
use stakechain_encoding::impl_encoding;
use std::time::{SystemTime, UNIX_EPOCH};

/// Height of a block; the genesis block is at height 0.
pub type BlockHeight = u64;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// The current Unix timestamp.
pub fn current_timestamp() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Locates the block stake output a block creator staked to create a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockStakeOutputIndexes {
    #[serde(rename = "BlockHeight")]
    pub block_height: BlockHeight,
    #[serde(rename = "TransactionIndex")]
    pub transaction_index: u64,
    #[serde(rename = "OutputIndex")]
    pub output_index: u64,
}

impl_encoding!(
    BlockStakeOutputIndexes,
    block_height,
    transaction_index,
    output_index
);

/// A coin payout created by a block, such as the block creator reward.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MinerPayout {
    pub value: Currency,
    #[serde(rename = "unlockhash")]
    pub unlock_hash: UnlockHash,
}

impl_encoding!(MinerPayout, value, unlock_hash);

/// The fixed-size summary of a block; hashing it yields the block ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    #[serde(rename = "parentid")]
    pub parent_id: BlockId,
    #[serde(rename = "pobsindexes")]
    pub pobs_output: BlockStakeOutputIndexes,
    pub timestamp: Timestamp,
    #[serde(rename = "merkleroot")]
    pub merkle_root: Hash,
}

impl_encoding!(BlockHeader, parent_id, pobs_output, timestamp, merkle_root);

impl BlockHeader {
    /// Encoded size of every header, in bytes.
    pub const ENCODED_SIZE: usize = 96;

    pub fn id(&self) -> BlockId {
        BlockId(hash_object(self))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "parentid")]
    pub parent_id: BlockId,
    pub timestamp: Timestamp,
    #[serde(rename = "pobsindexes")]
    pub pobs_output: BlockStakeOutputIndexes,
    #[serde(rename = "minerpayouts", default)]
    pub miner_payouts: Vec<MinerPayout>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

// wire order differs from the header: timestamp comes before the stake indexes
impl_encoding!(
    Block,
    parent_id,
    timestamp,
    pobs_output,
    miner_payouts,
    transactions
);

impl Block {
    /// Merkle root over each miner payout, then each transaction.
    pub fn merkle_root(&self) -> Hash {
        let mut tree = MerkleTree::new();
        for payout in &self.miner_payouts {
            tree.push_object(payout);
        }
        for tx in &self.transactions {
            tree.push_object(tx);
        }
        tree.root()
    }

    pub fn header(&self) -> BlockHeader {
        BlockHeader {
            parent_id: self.parent_id,
            pobs_output: self.pobs_output,
            timestamp: self.timestamp,
            merkle_root: self.merkle_root(),
        }
    }

    /// Same as `self.header().id()`.
    pub fn id(&self) -> BlockId {
        self.header().id()
    }

    /// ID of the miner payout at `index`.
    pub fn miner_payout_id(&self, index: u64) -> CoinOutputId {
        let mut hasher = ObjectHasher::new();
        hasher.write(&self.id()).write(&index);
        CoinOutputId(hasher.finish())
    }

    pub fn calculate_total_miner_fees(&self) -> Currency {
        self.transactions
            .iter()
            .flat_map(|tx| tx.miner_fees.iter())
            .sum()
    }

    pub fn is_genesis(&self) -> bool {
        self.parent_id == BlockId::default()
    }
}
