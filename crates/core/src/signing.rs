//! Contexts shared by condition checks, fulfillment verification and signing.

use crate::block::{BlockHeight, Timestamp};
use crate::condition::AtomicSwapSecret;
use crate::crypto::{KeyPair, PublicKey};
use crate::transaction::Transaction;
use stakechain_encoding::FixedEncode;
use std::io::Write;

/// An object mixed into a signature hash after the covered transaction fields.
///
/// The input index always comes first; fulfillments append their own
/// objects (the signing key, a revealed secret) after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtraObject {
    InputIndex(u64),
    PublicKey(PublicKey),
    Secret(AtomicSwapSecret),
}

impl FixedEncode for ExtraObject {
    fn fixed_encode<W: Write + ?Sized>(&self, w: &mut W) -> stakechain_encoding::Result<()> {
        match self {
            Self::InputIndex(index) => index.fixed_encode(w),
            Self::PublicKey(pk) => pk.fixed_encode(w),
            Self::Secret(secret) => secret.fixed_encode(w),
        }
    }
}

/// Chain state a condition needs to decide whether it can be fulfilled at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FulfillableContext {
    pub block_height: BlockHeight,
    pub block_time: Timestamp,
}

/// Everything needed to check one fulfillment against its parent condition.
#[derive(Debug, Clone, Copy)]
pub struct FulfillContext<'a> {
    pub input_index: u64,
    pub block_height: BlockHeight,
    pub block_time: Timestamp,
    pub transaction: &'a Transaction,
}

impl<'a> FulfillContext<'a> {
    pub fn fulfillable(&self) -> FulfillableContext {
        FulfillableContext {
            block_height: self.block_height,
            block_time: self.block_time,
        }
    }

    /// The extra objects every signature of this input starts with.
    pub fn extra_objects(&self) -> Vec<ExtraObject> {
        vec![ExtraObject::InputIndex(self.input_index)]
    }
}

/// Everything needed to sign one input.
#[derive(Clone, Copy)]
pub struct SignContext<'a> {
    pub input_index: u64,
    pub transaction: &'a Transaction,
    pub key: &'a KeyPair,
}

impl<'a> SignContext<'a> {
    pub fn extra_objects(&self) -> Vec<ExtraObject> {
        vec![ExtraObject::InputIndex(self.input_index)]
    }
}
