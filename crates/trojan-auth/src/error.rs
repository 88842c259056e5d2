//! Authentication error types.

use trojan_core::{ERROR_DECODE, ERROR_REMOTE_FETCH};

/// Authentication error.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Invalid credentials provided.
    #[error("invalid credential")]
    Invalid,
}

/// Error fetching or decoding the remote user directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// Request could not be sent, timed out or the body could not be read.
    #[error("fetch: {0}")]
    Fetch(String),

    /// Remote answered with an unexpected status.
    #[error("directory returned HTTP {0}")]
    Status(u16),

    /// Payload is not a valid user list.
    #[error("decode: {0}")]
    Decode(String),
}

impl DirectoryError {
    /// Create a fetch error from any error type.
    #[inline]
    pub fn fetch<E: std::fmt::Display>(err: E) -> Self {
        Self::Fetch(err.to_string())
    }

    /// Get the error type string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            DirectoryError::Fetch(_) | DirectoryError::Status(_) => ERROR_REMOTE_FETCH,
            DirectoryError::Decode(_) => ERROR_DECODE,
        }
    }
}
