//! Error types for request validation, marshalling and signing.

use thiserror::Error;

/// Client-level errors.
#[derive(Error, Debug)]
pub enum NotifError {
    /// Caller supplied a null, empty, malformed, oversized or reserved value.
    #[error("{0}")]
    InvalidArgument(String),

    /// The runtime cannot provide HMAC-SHA256. Retrying will not help.
    #[error("Unrecoverable configuration error: {0}")]
    UnrecoverableConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NotifError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        NotifError::InvalidArgument(msg.into())
    }

    /// True when the caller should abort startup instead of fixing its input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, NotifError::UnrecoverableConfig(_))
    }
}

pub type NotifResult<T> = Result<T, NotifError>;
