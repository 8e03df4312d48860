//! Transaction and block validation for stakechain.
//!
//! This crate provides:
//! - Standalone transaction validation against the outputs it spends
//! - Strict (standardness) checks for relayed transactions
//! - Structural block validation (size, double spends, miner payouts)
//!
//! # Example
//!
//! ```rust,no_run
//! use stakechain_consensus::{SpentOutputs, TransactionValidationContext, TransactionValidator};
//! use stakechain_core::{ChainConstants, Transaction};
//!
//! let constants = ChainConstants::standard().transaction_validation_constants();
//! let ctx = TransactionValidationContext::new(100, 1_600_000_000, &constants);
//! let parents = SpentOutputs::new();
//!
//! let tx = Transaction::default();
//! TransactionValidator::validate(&tx, &ctx, &parents).unwrap_err();
//! ```

pub mod context;
pub mod validator;

// Re-export commonly used types
pub use context::{
    BlockValidationContext, ParentConditions, SpentOutputs, TransactionValidationContext,
};
pub use validator::{BlockValidator, TransactionValidator, ValidationError};
