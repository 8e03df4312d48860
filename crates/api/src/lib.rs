//! HTTP-facing error handling for stakechain services.
//!
//! Handlers return [`ClientError`] for failures caused by the caller; axum
//! turns them into a status code and a JSON `{"message": ...}` body.

pub mod error;

pub use error::{ClientError, ClientErrorKind, ErrorBody};
