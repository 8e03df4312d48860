//! Errors produced while encoding or decoding.

use std::io;
use thiserror::Error;

/// Errors that can occur during binary encoding and decoding.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("io error: {0}")]
    Io(io::Error),

    #[error("length prefix {len} exceeds maximum of {max}")]
    LengthTooLarge { len: u64, max: u64 },

    #[error("slice length {0} cannot be represented by a compact prefix")]
    SliceTooLong(usize),

    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),

    #[error("unknown {kind} tag {tag}")]
    UnknownTag { kind: &'static str, tag: u8 },

    #[error("{0} trailing bytes after decoding")]
    TrailingBytes(usize),

    #[error("invalid value: {0}")]
    InvalidValue(String),
}

impl EncodingError {
    /// Shorthand for a decoded value that is well-formed but not acceptable.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidValue(msg.into())
    }
}

impl From<io::Error> for EncodingError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::UnexpectedEof
        } else {
            Self::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, EncodingError>;
