//! Validation contexts and the lookup of the outputs a transaction spends.

use stakechain_core::{
    BlockHeight, BlockStakeOutput, BlockStakeOutputId, ChainConstants, CoinOutput, CoinOutputId,
    FulfillableContext, Timestamp, TransactionValidationConstants, UnlockCondition,
};
use std::collections::HashMap;

/// Chain state and constants a single transaction is validated against.
#[derive(Debug, Clone, Copy)]
pub struct TransactionValidationContext<'a> {
    pub block_height: BlockHeight,
    pub block_time: Timestamp,
    /// Block creating transactions are exempt from the miner fee requirement.
    pub is_block_creating_tx: bool,
    pub constants: &'a TransactionValidationConstants,
}

impl<'a> TransactionValidationContext<'a> {
    pub fn new(
        block_height: BlockHeight,
        block_time: Timestamp,
        constants: &'a TransactionValidationConstants,
    ) -> Self {
        Self {
            block_height,
            block_time,
            is_block_creating_tx: false,
            constants,
        }
    }

    pub fn block_creating(mut self) -> Self {
        self.is_block_creating_tx = true;
        self
    }

    pub fn fulfillable(&self) -> FulfillableContext {
        FulfillableContext {
            block_height: self.block_height,
            block_time: self.block_time,
        }
    }
}

/// Chain state and constants a block is validated against.
#[derive(Debug, Clone, Copy)]
pub struct BlockValidationContext<'a> {
    pub block_height: BlockHeight,
    pub constants: &'a ChainConstants,
}

/// Resolves the conditions of the outputs spent by transaction inputs.
pub trait ParentConditions {
    fn coin_output_condition(&self, id: &CoinOutputId) -> Option<&UnlockCondition>;

    fn block_stake_output_condition(&self, id: &BlockStakeOutputId) -> Option<&UnlockCondition>;
}

impl ParentConditions for HashMap<CoinOutputId, UnlockCondition> {
    fn coin_output_condition(&self, id: &CoinOutputId) -> Option<&UnlockCondition> {
        self.get(id)
    }

    fn block_stake_output_condition(&self, _id: &BlockStakeOutputId) -> Option<&UnlockCondition> {
        None
    }
}

impl ParentConditions for HashMap<BlockStakeOutputId, UnlockCondition> {
    fn coin_output_condition(&self, _id: &CoinOutputId) -> Option<&UnlockCondition> {
        None
    }

    fn block_stake_output_condition(&self, id: &BlockStakeOutputId) -> Option<&UnlockCondition> {
        self.get(id)
    }
}

/// The unspent outputs a set of transactions may spend, keyed by output ID.
#[derive(Debug, Clone, Default)]
pub struct SpentOutputs {
    pub coin_outputs: HashMap<CoinOutputId, CoinOutput>,
    pub block_stake_outputs: HashMap<BlockStakeOutputId, BlockStakeOutput>,
}

impl SpentOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_coin_output(&mut self, id: CoinOutputId, output: CoinOutput) {
        self.coin_outputs.insert(id, output);
    }

    pub fn insert_block_stake_output(&mut self, id: BlockStakeOutputId, output: BlockStakeOutput) {
        self.block_stake_outputs.insert(id, output);
    }
}

impl ParentConditions for SpentOutputs {
    fn coin_output_condition(&self, id: &CoinOutputId) -> Option<&UnlockCondition> {
        self.coin_outputs.get(id).map(|output| &output.condition)
    }

    fn block_stake_output_condition(&self, id: &BlockStakeOutputId) -> Option<&UnlockCondition> {
        self.block_stake_outputs.get(id).map(|output| &output.condition)
    }
}
