//! Binary codecs for stakechain.
//!
//! Two independent wire formats are provided:
//! - The fixed codec: 8-byte little-endian integers and length prefixes.
//!   All consensus hashing (IDs, Merkle leaves, signature hashes) uses it.
//! - The compact codec: variable-length slice prefixes of 1 to 4 bytes,
//!   with integers kept at their native width.
//!
//! Types opt in by implementing the encode/decode traits of each codec,
//! usually through [`impl_fixed_encoding!`], [`impl_compact_encoding!`]
//! or the combined [`impl_encoding!`].

pub mod codec;
pub mod compact;
pub mod error;
pub mod fixed;
mod macros;

pub use codec::{Codec, Compact, Fixed};
pub use compact::{
    from_compact_bytes, read_compact_bytes, read_slice_len, to_compact_bytes,
    write_compact_bytes, write_slice_len, CompactDecode, CompactEncode,
};
pub use error::{EncodingError, Result};
pub use fixed::{
    fixed_size, from_fixed_bytes, read_fixed_bytes, read_prefix, to_fixed_bytes,
    write_fixed_bytes, write_prefix, FixedDecode, FixedEncode,
};

/// Upper bound for any decoded length prefix, in bytes or elements.
pub const MAX_SLICE_SIZE: usize = 5_000_000;

/// Initial capacity ceiling when decoding sequences, so a hostile
/// length prefix cannot trigger a large allocation up front.
pub(crate) const PREALLOC_LIMIT: usize = 1024;
