//! Covered fields: which parts of a transaction a signature commits to.
//!
//! A declaration either covers the whole transaction or lists, per field
//! category, the indices it covers. Lists must be strictly increasing and
//! in bounds.

use crate::hash::{Hash, ObjectHasher};
use crate::signing::ExtraObject;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use stakechain_encoding::{impl_encoding, FixedEncode};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoveredFieldsError {
    #[error("covered fields cover the whole transaction and individual fields at once")]
    WholeTransactionViolation,
    #[error("sorted unique violation")]
    SortedUniqueViolation,
}

pub type Result<T> = std::result::Result<T, CoveredFieldsError>;

/// The kind of input a signature belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Coin,
    BlockStake,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoveredFields {
    #[serde(rename = "wholetransaction")]
    pub whole_transaction: bool,
    #[serde(rename = "coininputs", default)]
    pub coin_inputs: Vec<u64>,
    #[serde(rename = "coinoutputs", default)]
    pub coin_outputs: Vec<u64>,
    #[serde(rename = "blockstakeinputs", default)]
    pub block_stake_inputs: Vec<u64>,
    #[serde(rename = "blockstakeoutputs", default)]
    pub block_stake_outputs: Vec<u64>,
    #[serde(rename = "minerfees", default)]
    pub miner_fees: Vec<u64>,
    #[serde(rename = "arbitrarydata", default)]
    pub arbitrary_data: Vec<u64>,
    #[serde(rename = "transactionsignatures", default)]
    pub transaction_signatures: Vec<u64>,
}

impl_encoding!(
    CoveredFields,
    whole_transaction,
    coin_inputs,
    coin_outputs,
    block_stake_inputs,
    block_stake_outputs,
    miner_fees,
    arbitrary_data,
    transaction_signatures
);

/// Whether `elems` is strictly increasing with every element below `max`.
pub fn sorted_unique(elems: &[u64], max: usize) -> bool {
    let Some(&last) = elems.last() else {
        return true;
    };
    elems.windows(2).all(|pair| pair[0] < pair[1]) && last < max as u64
}

impl CoveredFields {
    pub fn whole_transaction() -> Self {
        Self {
            whole_transaction: true,
            ..Default::default()
        }
    }

    fn covers_individual_fields(&self) -> bool {
        !(self.coin_inputs.is_empty()
            && self.coin_outputs.is_empty()
            && self.block_stake_inputs.is_empty()
            && self.block_stake_outputs.is_empty()
            && self.miner_fees.is_empty()
            && self.arbitrary_data.is_empty())
    }

    /// Check the declaration against `tx`, which carries `signature_count`
    /// signatures.
    pub fn validate(&self, tx: &Transaction, signature_count: usize) -> Result<()> {
        if self.whole_transaction && self.covers_individual_fields() {
            return Err(CoveredFieldsError::WholeTransactionViolation);
        }
        let arbitrary_data_elements = usize::from(!tx.arbitrary_data.is_empty());
        let checks = [
            (&self.coin_inputs, tx.coin_inputs.len()),
            (&self.coin_outputs, tx.coin_outputs.len()),
            (&self.block_stake_inputs, tx.block_stake_inputs.len()),
            (&self.block_stake_outputs, tx.block_stake_outputs.len()),
            (&self.miner_fees, tx.miner_fees.len()),
            (&self.arbitrary_data, arbitrary_data_elements),
            (&self.transaction_signatures, signature_count),
        ];
        if checks.iter().all(|(elems, max)| sorted_unique(elems, *max)) {
            Ok(())
        } else {
            Err(CoveredFieldsError::SortedUniqueViolation)
        }
    }

    /// Whether the signature of input `index` is required under this declaration.
    pub fn requires_signature(&self, kind: InputKind, index: u64) -> bool {
        if self.whole_transaction {
            return true;
        }
        match kind {
            InputKind::Coin => self.coin_inputs.contains(&index),
            InputKind::BlockStake => self.block_stake_inputs.contains(&index),
        }
    }

    /// The hash a signature under this declaration commits to.
    ///
    /// Whole-transaction declarations use the regular signature hash. Otherwise
    /// only the selected elements are hashed; inputs contribute their parent ID.
    /// Indices out of range are skipped, so validate first.
    pub fn signature_hash(&self, tx: &Transaction, extras: &[ExtraObject]) -> Hash {
        if self.whole_transaction {
            return tx.signature_hash(extras);
        }
        let mut hasher = ObjectHasher::new();
        hasher.write(&(tx.version as u8));
        for extra in extras {
            hasher.write(extra);
        }
        let coin_parents: Vec<_> = tx.coin_inputs.iter().map(|i| i.parent_id).collect();
        write_selected(&mut hasher, &coin_parents, &self.coin_inputs);
        write_selected(&mut hasher, &tx.coin_outputs, &self.coin_outputs);
        let stake_parents: Vec<_> = tx.block_stake_inputs.iter().map(|i| i.parent_id).collect();
        write_selected(&mut hasher, &stake_parents, &self.block_stake_inputs);
        write_selected(&mut hasher, &tx.block_stake_outputs, &self.block_stake_outputs);
        write_selected(&mut hasher, &tx.miner_fees, &self.miner_fees);
        if self.arbitrary_data.contains(&0) {
            hasher.write(&tx.arbitrary_data);
        }
        hasher.write(&self.transaction_signatures);
        hasher.finish()
    }
}

fn write_selected<T: FixedEncode>(hasher: &mut ObjectHasher, items: &[T], indices: &[u64]) {
    for item in indices.iter().filter_map(|&i| items.get(i as usize)) {
        hasher.write(item);
    }
}
