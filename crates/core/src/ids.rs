//! Typed identifiers and 16-byte specifiers.

use crate::hash::Hash;
use stakechain_encoding::impl_encoding;
use std::fmt;

/// Size of a specifier, in bytes.
pub const SPECIFIER_SIZE: usize = 16;

/// A short, zero-padded ASCII label mixed into hashes to separate domains.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Specifier(pub [u8; SPECIFIER_SIZE]);

impl Specifier {
    /// Build a specifier from a label; labels longer than 16 bytes are cut.
    pub const fn new(label: &[u8]) -> Self {
        let mut out = [0u8; SPECIFIER_SIZE];
        let mut i = 0;
        while i < label.len() && i < SPECIFIER_SIZE {
            out[i] = label[i];
            i += 1;
        }
        Self(out)
    }

    /// The label without its zero padding.
    pub fn label(&self) -> String {
        let end = self
            .0
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(SPECIFIER_SIZE);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }
}

impl fmt::Debug for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Specifier({:?})", self.label())
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl_encoding!(Specifier, 0);

pub const SPECIFIER_MINER_PAYOUT: Specifier = Specifier::new(b"miner payout");
pub const SPECIFIER_COIN_INPUT: Specifier = Specifier::new(b"coin input");
pub const SPECIFIER_COIN_OUTPUT: Specifier = Specifier::new(b"coin output");
pub const SPECIFIER_BLOCK_STAKE_INPUT: Specifier = Specifier::new(b"blstake input");
pub const SPECIFIER_BLOCK_STAKE_OUTPUT: Specifier = Specifier::new(b"blstake output");
pub const SPECIFIER_MINER_FEE: Specifier = Specifier::new(b"miner fee");

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            Default,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Hash);

        impl $name {
            pub fn as_hash(&self) -> &Hash {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                self.0.to_hex()
            }

            pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
                Hash::from_hex(s).map(Self)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), &self.to_hex()[..8])
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Hash> for $name {
            fn from(hash: Hash) -> Self {
                Self(hash)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                self.0.as_ref()
            }
        }

        impl_encoding!($name, 0);
    };
}

define_id!(
    /// Identifies a block; the hash of its header.
    BlockId
);
define_id!(
    /// Identifies a transaction.
    TransactionId
);
define_id!(
    /// Identifies a coin output; also the parent ID of the coin input spending it.
    CoinOutputId
);
define_id!(
    /// Identifies a block stake output.
    BlockStakeOutputId
);
