//! Error types for the todo API client.
//!
//! # Design
//! Every failure shape (service rejection, missing resource, network failure,
//! malformed body) is normalized into one `ApiError` whose `Display` is the
//! human-readable message the store puts in its error slot. The variants are
//! kept so callers can still branch on `kind()` without parsing text.

use thiserror::Error;

/// Message used when neither the service nor the transport gave one.
pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred";

/// Errors returned by `TodoClient` parse methods and the transports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The service rejected the payload (400 or 422).
    #[error("{message}")]
    Validation { message: String },

    /// The service returned 404; the requested todo does not exist.
    #[error("{message}")]
    NotFound { message: String },

    /// The service returned some other unexpected status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),

    /// The request did not complete within the configured timeout.
    #[error("Request timeout")]
    Timeout,

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Coarse classification of an `ApiError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Transport,
    Unknown,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: non_empty(message.into()),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound {
            message: non_empty(message.into()),
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        ApiError::Http {
            status,
            message: non_empty(message.into()),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        ApiError::Transport(non_empty(message.into()))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation { .. } => ErrorKind::Validation,
            ApiError::NotFound { .. } => ErrorKind::NotFound,
            ApiError::Transport(_) | ApiError::Timeout => ErrorKind::Transport,
            ApiError::Http { .. } | ApiError::Deserialization(_) | ApiError::Serialization(_) => {
                ErrorKind::Unknown
            }
        }
    }
}

fn non_empty(message: String) -> String {
    if message.trim().is_empty() {
        FALLBACK_MESSAGE.to_string()
    } else {
        message
    }
}
