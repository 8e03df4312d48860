//! Merkle tree used for block roots and multisig unlock hashes.
//!
//! Leaves are hashed as `H(0x00 ‖ data)` and nodes as `H(0x01 ‖ left ‖ right)`.
//! Only the roots of complete subtrees are kept, so pushing is O(log n) and
//! an odd leaf is never duplicated: it is joined as-is when the root is taken.

use crate::hash::{hash_concat, Hash};
use stakechain_encoding::{to_fixed_bytes, FixedEncode};

const LEAF_PREFIX: [u8; 1] = [0x00];
const NODE_PREFIX: [u8; 1] = [0x01];

pub fn leaf_hash(data: &[u8]) -> Hash {
    hash_concat(&[&LEAF_PREFIX, data])
}

pub fn node_hash(left: &Hash, right: &Hash) -> Hash {
    hash_concat(&[&NODE_PREFIX, left.as_ref(), right.as_ref()])
}

#[derive(Debug, Clone, Copy)]
struct Subtree {
    height: u32,
    sum: Hash,
}

/// An append-only Merkle tree.
#[derive(Debug, Clone, Default)]
pub struct MerkleTree {
    // Complete subtrees, oldest (and tallest) first.
    stack: Vec<Subtree>,
    leaves: u64,
}

impl MerkleTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a leaf holding raw data.
    pub fn push(&mut self, data: &[u8]) {
        let mut current = Subtree {
            height: 0,
            sum: leaf_hash(data),
        };
        while let Some(top) = self.stack.last() {
            if top.height != current.height {
                break;
            }
            current = Subtree {
                height: current.height + 1,
                sum: node_hash(&top.sum, &current.sum),
            };
            self.stack.pop();
        }
        self.stack.push(current);
        self.leaves += 1;
    }

    /// Append a leaf holding the fixed encoding of `object`.
    pub fn push_object<T: FixedEncode + ?Sized>(&mut self, object: &T) {
        self.push(&to_fixed_bytes(object));
    }

    pub fn leaf_count(&self) -> u64 {
        self.leaves
    }

    /// The root of the tree; the zero hash when no leaves were pushed.
    pub fn root(&self) -> Hash {
        let mut subtrees = self.stack.iter().rev();
        let Some(last) = subtrees.next() else {
            return Hash::ZERO;
        };
        subtrees.fold(last.sum, |acc, older| node_hash(&older.sum, &acc))
    }
}

/// Compute the root over a list of raw leaves.
pub fn merkle_root<L: AsRef<[u8]>>(leaves: &[L]) -> Hash {
    let mut tree = MerkleTree::new();
    for leaf in leaves {
        tree.push(leaf.as_ref());
    }
    tree.root()
}
