//! Client errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use stakechain_consensus::ValidationError;
use std::fmt;
use thiserror::Error;
use tracing::error;

/// Category of a client error. The numeric codes are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum ClientErrorKind {
    #[default]
    BadRequest = 0,
    Unauthorized = 1,
    PaymentRequired = 2,
    Forbidden = 3,
    NotFound = 4,
    Timeout = 8,
}

impl ClientErrorKind {
    pub fn code(self) -> u32 {
        self as u32
    }

    /// The kind with the given code, if one is assigned.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::BadRequest),
            1 => Some(Self::Unauthorized),
            2 => Some(Self::PaymentRequired),
            3 => Some(Self::Forbidden),
            4 => Some(Self::NotFound),
            8 => Some(Self::Timeout),
            _ => None,
        }
    }

    pub fn status_code(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

impl fmt::Display for ClientErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BadRequest => "bad request",
            Self::Unauthorized => "unauthorized",
            Self::PaymentRequired => "payment required",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::Timeout => "time out",
        })
    }
}

/// An error caused by the API caller.
#[derive(Debug, Error)]
#[error("User Error {kind}: {err}")]
pub struct ClientError {
    pub kind: ClientErrorKind,
    pub err: anyhow::Error,
}

impl ClientError {
    pub fn new(kind: ClientErrorKind, err: impl Into<anyhow::Error>) -> Self {
        Self {
            kind,
            err: err.into(),
        }
    }

    /// Create an error from a raw kind code.
    ///
    /// Unassigned codes are an internal fault; they are logged and the
    /// error is reported as a bad request.
    pub fn from_code(code: u32, err: impl Into<anyhow::Error>) -> Self {
        let err = err.into();
        let kind = ClientErrorKind::from_code(code).unwrap_or_else(|| {
            error!(code, %err, "invalid client error kind");
            ClientErrorKind::BadRequest
        });
        Self { kind, err }
    }

    pub fn bad_request(err: impl Into<anyhow::Error>) -> Self {
        Self::new(ClientErrorKind::BadRequest, err)
    }

    pub fn not_found(err: impl Into<anyhow::Error>) -> Self {
        Self::new(ClientErrorKind::NotFound, err)
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }
}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err)
    }
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl IntoResponse for ClientError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
