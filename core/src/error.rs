//! Error types for the wallet API client.
//!
//! # Design
//! `NotFound` and `Conflict` get dedicated variants because callers routinely
//! branch on "no such wallet" and "name already taken". Every other failure
//! coming back from the service lands in `Transport` with the raw status and
//! body. Local failures (`Configuration`, `InvalidArgument`) never reach the
//! network.

use thiserror::Error;

/// Coarse classification of an `ApiError`, handy for matching without
/// destructuring payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    InvalidArgument,
    NotFound,
    Conflict,
    Transport,
    Serialization,
    Deserialization,
}

/// Errors returned by the wallet API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A credential or other client setting is missing or malformed.
    #[error("invalid client configuration: {0}")]
    Configuration(String),

    /// A required call argument is missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The service returned 404 for a wallet or balance lookup.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The service returned 409 while creating a wallet.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// Network failure, timeout, or any status not mapped above.
    /// `status` is `None` when no response was received.
    #[error("transport error{}: {message}", status_suffix(.status))]
    Transport {
        status: Option<u16>,
        body: String,
        message: String,
    },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Configuration(_) => ErrorKind::Configuration,
            ApiError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ApiError::NotFound { .. } => ErrorKind::NotFound,
            ApiError::Conflict { .. } => ErrorKind::Conflict,
            ApiError::Transport { .. } => ErrorKind::Transport,
            ApiError::Serialization(_) => ErrorKind::Serialization,
            ApiError::Deserialization(_) => ErrorKind::Deserialization,
        }
    }

    /// HTTP status associated with the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Conflict { .. } => Some(409),
            ApiError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// A transport failure where no HTTP response was received.
    pub fn network(message: impl Into<String>) -> Self {
        ApiError::Transport {
            status: None,
            body: String::new(),
            message: message.into(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}
