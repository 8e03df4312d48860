//! Transaction and block validation rules.
//!
//! Standalone validation short-circuits on the first broken rule, checked
//! in this order: size, double spends, minimum values, arbitrary data,
//! time locks, then fulfillments.

use crate::context::{BlockValidationContext, ParentConditions, TransactionValidationContext};
use stakechain_core::covered_fields::InputKind;
use stakechain_core::{
    Block, ConditionError, Currency, FulfillContext, FulfillmentError, Transaction,
    UnlockCondition,
};
use stakechain_encoding::{Codec, Fixed};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Bytes of a block reserved for everything but a single transaction.
pub use stakechain_core::constants::BLOCK_SIZE_RESERVE;

/// Errors that can occur during validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("transaction is too large to fit in a block ({size} > {limit} bytes)")]
    TransactionTooLarge { size: u64, limit: u64 },

    #[error("transaction uses a parent object twice")]
    DoubleSpend,

    #[error("transaction cannot have an output or payout that has zero value")]
    ZeroOutput,

    #[error("transaction has a too small miner fee")]
    TooSmallMinerFee,

    #[error("transaction does not specify any miner fees")]
    MissingMinerFee,

    #[error("arbitrary data is too large to fit in a transaction ({size} > {limit} bytes)")]
    ArbitraryDataTooLarge { size: u64, limit: u64 },

    #[error("time lock of the {kind:?} input #{index} is not yet satisfied")]
    TimelockNotSatisfied { kind: InputKind, index: usize },

    #[error("no unspent output known for the {kind:?} input #{index}")]
    MissingParentCondition { kind: InputKind, index: usize },

    #[error("{kind:?} input #{index} is not fulfilled: {source}")]
    InvalidFulfillment {
        kind: InputKind,
        index: usize,
        source: FulfillmentError,
    },

    #[error("no parent ID defined for {kind:?} input #{index}")]
    UndefinedParentId { kind: InputKind, index: usize },

    #[error("non-standard output condition: {0}")]
    NonStandardCondition(#[from] ConditionError),

    #[error("{kind:?} input #{index} has a non-standard fulfillment: {source}")]
    NonStandardFulfillment {
        kind: InputKind,
        index: usize,
        source: FulfillmentError,
    },

    #[error("failed to encode: {0}")]
    Unencodable(String),

    #[error("block is too large ({size} > {limit} bytes)")]
    BlockTooLarge { size: u64, limit: u64 },

    #[error("block miner payouts do not match the block creator fee and miner fees")]
    BadMinerPayouts,
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Transaction validator.
pub struct TransactionValidator;

impl TransactionValidator {
    /// Full standalone validation of a transaction whose parents are
    /// resolved through `parents`.
    pub fn validate<P: ParentConditions + ?Sized>(
        tx: &Transaction,
        ctx: &TransactionValidationContext<'_>,
        parents: &P,
    ) -> Result<()> {
        let result = Self::validate_rules(tx, ctx, parents);
        if let Err(err) = &result {
            match err {
                ValidationError::Unencodable(_) => debug!(%err, "transaction rejected"),
                _ => debug!(tx = %tx.id(), %err, "transaction rejected"),
            }
        }
        result
    }

    fn validate_rules<P: ParentConditions + ?Sized>(
        tx: &Transaction,
        ctx: &TransactionValidationContext<'_>,
        parents: &P,
    ) -> Result<()> {
        Self::fits_in_a_block(tx, ctx.constants.block_size_limit)?;
        Self::no_double_spends(tx)?;
        Self::follows_minimum_values(
            tx,
            &ctx.constants.minimum_miner_fee,
            ctx.is_block_creating_tx,
        )?;
        Self::arbitrary_data_fits(tx, ctx.constants.arbitrary_data_size_limit)?;
        Self::time_locks_satisfied(tx, ctx, parents)?;
        Self::inputs_fulfilled(tx, ctx, parents)?;
        Ok(())
    }

    /// The fixed encoding must leave the block reserve free.
    pub fn fits_in_a_block(tx: &Transaction, block_size_limit: u64) -> Result<()> {
        let size = Fixed::to_bytes(tx)
            .map_err(|err| ValidationError::Unencodable(err.to_string()))?
            .len() as u64;
        let limit = block_size_limit.saturating_sub(BLOCK_SIZE_RESERVE);
        if size > limit {
            return Err(ValidationError::TransactionTooLarge { size, limit });
        }
        Ok(())
    }

    /// No parent ID may repeat among the coin inputs, nor among the block
    /// stake inputs.
    pub fn no_double_spends(tx: &Transaction) -> Result<()> {
        let mut coins = HashSet::with_capacity(tx.coin_inputs.len());
        if !tx.coin_inputs.iter().all(|ci| coins.insert(ci.parent_id)) {
            return Err(ValidationError::DoubleSpend);
        }
        let mut stakes = HashSet::with_capacity(tx.block_stake_inputs.len());
        if !tx
            .block_stake_inputs
            .iter()
            .all(|bsi| stakes.insert(bsi.parent_id))
        {
            return Err(ValidationError::DoubleSpend);
        }
        Ok(())
    }

    pub fn follows_minimum_values(
        tx: &Transaction,
        minimum_miner_fee: &Currency,
        is_block_creating_tx: bool,
    ) -> Result<()> {
        let zero_output = tx.coin_outputs.iter().any(|co| co.value.is_zero())
            || tx.block_stake_outputs.iter().any(|bso| bso.value.is_zero());
        if zero_output {
            return Err(ValidationError::ZeroOutput);
        }
        if tx.miner_fees.iter().any(|fee| fee < minimum_miner_fee) {
            return Err(ValidationError::TooSmallMinerFee);
        }
        if !is_block_creating_tx && tx.miner_fees.is_empty() && !minimum_miner_fee.is_zero() {
            return Err(ValidationError::MissingMinerFee);
        }
        Ok(())
    }

    pub fn arbitrary_data_fits(tx: &Transaction, size_limit: u64) -> Result<()> {
        let size = tx.arbitrary_data.len() as u64;
        if size > size_limit {
            return Err(ValidationError::ArbitraryDataTooLarge {
                size,
                limit: size_limit,
            });
        }
        Ok(())
    }

    /// Every spent output must be fulfillable at the context's height and time.
    pub fn time_locks_satisfied<P: ParentConditions + ?Sized>(
        tx: &Transaction,
        ctx: &TransactionValidationContext<'_>,
        parents: &P,
    ) -> Result<()> {
        for (kind, index, condition) in Self::parent_conditions(tx, parents) {
            if !condition?.fulfillable(ctx.fulfillable()) {
                return Err(ValidationError::TimelockNotSatisfied { kind, index });
            }
        }
        Ok(())
    }

    /// Every input's fulfillment must pair with, and verify against, the
    /// condition of the output it spends.
    pub fn inputs_fulfilled<P: ParentConditions + ?Sized>(
        tx: &Transaction,
        ctx: &TransactionValidationContext<'_>,
        parents: &P,
    ) -> Result<()> {
        let fulfillments = tx
            .coin_inputs
            .iter()
            .map(|ci| &ci.fulfillment)
            .chain(tx.block_stake_inputs.iter().map(|bsi| &bsi.fulfillment));
        for ((kind, index, condition), fulfillment) in
            Self::parent_conditions(tx, parents).zip(fulfillments)
        {
            let fulfill_ctx = FulfillContext {
                input_index: index as u64,
                block_height: ctx.block_height,
                block_time: ctx.block_time,
                transaction: tx,
            };
            condition?
                .fulfill(fulfillment, &fulfill_ctx)
                .map_err(|source| ValidationError::InvalidFulfillment {
                    kind,
                    index,
                    source,
                })?;
        }
        Ok(())
    }

    /// Strict checks on every output condition and input fulfillment, as
    /// applied to transactions accepted for relay.
    pub fn validate_standard(tx: &Transaction) -> Result<()> {
        for (index, ci) in tx.coin_inputs.iter().enumerate() {
            if ci.parent_id == Default::default() {
                return Err(ValidationError::UndefinedParentId {
                    kind: InputKind::Coin,
                    index,
                });
            }
            ci.fulfillment
                .is_standard()
                .map_err(|source| ValidationError::NonStandardFulfillment {
                    kind: InputKind::Coin,
                    index,
                    source,
                })?;
        }
        for (index, bsi) in tx.block_stake_inputs.iter().enumerate() {
            if bsi.parent_id == Default::default() {
                return Err(ValidationError::UndefinedParentId {
                    kind: InputKind::BlockStake,
                    index,
                });
            }
            bsi.fulfillment
                .is_standard()
                .map_err(|source| ValidationError::NonStandardFulfillment {
                    kind: InputKind::BlockStake,
                    index,
                    source,
                })?;
        }
        for co in &tx.coin_outputs {
            co.condition.is_standard()?;
        }
        for bso in &tx.block_stake_outputs {
            bso.condition.is_standard()?;
        }
        Ok(())
    }

    /// The parent condition of every input, coin inputs first, each tagged
    /// with its kind and index within that kind.
    fn parent_conditions<'a, P: ParentConditions + ?Sized + 'a>(
        tx: &'a Transaction,
        parents: &'a P,
    ) -> impl Iterator<Item = (InputKind, usize, Result<&'a UnlockCondition>)> + 'a {
        let coins = tx.coin_inputs.iter().enumerate().map(move |(index, ci)| {
            let kind = InputKind::Coin;
            let condition = parents
                .coin_output_condition(&ci.parent_id)
                .ok_or(ValidationError::MissingParentCondition { kind, index });
            (kind, index, condition)
        });
        let stakes = tx
            .block_stake_inputs
            .iter()
            .enumerate()
            .map(move |(index, bsi)| {
                let kind = InputKind::BlockStake;
                let condition = parents
                    .block_stake_output_condition(&bsi.parent_id)
                    .ok_or(ValidationError::MissingParentCondition { kind, index });
                (kind, index, condition)
            });
        coins.chain(stakes)
    }
}

/// Block validator.
pub struct BlockValidator;

impl BlockValidator {
    /// Structural validation of a block and every transaction in it.
    ///
    /// The first transaction of a block is its block creating transaction.
    pub fn validate_block<P: ParentConditions + ?Sized>(
        block: &Block,
        ctx: &BlockValidationContext<'_>,
        parents: &P,
    ) -> Result<()> {
        let result = Self::validate_rules(block, ctx, parents);
        if let Err(err) = &result {
            debug!(height = ctx.block_height, %err, "block rejected");
        }
        result
    }

    fn validate_rules<P: ParentConditions + ?Sized>(
        block: &Block,
        ctx: &BlockValidationContext<'_>,
        parents: &P,
    ) -> Result<()> {
        Self::validate_size(block, ctx.constants.block_size_limit)?;
        let constants = ctx.constants.transaction_validation_constants();
        for (index, tx) in block.transactions.iter().enumerate() {
            let mut tx_ctx =
                TransactionValidationContext::new(ctx.block_height, block.timestamp, &constants);
            if index == 0 {
                tx_ctx = tx_ctx.block_creating();
            }
            TransactionValidator::validate(tx, &tx_ctx, parents)?;
        }
        Self::validate_no_double_spends(block)?;
        if !block.is_genesis() {
            Self::validate_miner_payouts(block, &ctx.constants.block_creator_fee)?;
        }
        Ok(())
    }

    pub fn validate_size(block: &Block, block_size_limit: u64) -> Result<()> {
        let size = Fixed::to_bytes(block)
            .map_err(|err| ValidationError::Unencodable(err.to_string()))?
            .len() as u64;
        if size > block_size_limit {
            return Err(ValidationError::BlockTooLarge {
                size,
                limit: block_size_limit,
            });
        }
        Ok(())
    }

    /// No output may be spent by two inputs anywhere in the block.
    pub fn validate_no_double_spends(block: &Block) -> Result<()> {
        let mut coins = HashSet::new();
        let mut stakes = HashSet::new();
        for tx in &block.transactions {
            if !tx.coin_inputs.iter().all(|ci| coins.insert(ci.parent_id)) {
                return Err(ValidationError::DoubleSpend);
            }
            if !tx
                .block_stake_inputs
                .iter()
                .all(|bsi| stakes.insert(bsi.parent_id))
            {
                return Err(ValidationError::DoubleSpend);
            }
        }
        Ok(())
    }

    /// Payouts must be non-zero and add up to the block creator fee plus all
    /// miner fees of the block.
    pub fn validate_miner_payouts(block: &Block, block_creator_fee: &Currency) -> Result<()> {
        if block.miner_payouts.iter().any(|p| p.value.is_zero()) {
            return Err(ValidationError::ZeroOutput);
        }
        let paid: Currency = block.miner_payouts.iter().map(|p| &p.value).sum();
        let expected = block_creator_fee + &block.calculate_total_miner_fees();
        if paid != expected {
            return Err(ValidationError::BadMinerPayouts);
        }
        Ok(())
    }
}
