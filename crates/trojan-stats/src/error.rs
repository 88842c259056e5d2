//! Stats error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use trojan_core::{ERROR_AUTHORIZATION, ERROR_EXPORT, ERROR_MALFORMED_REQUEST, ERROR_REMOTE_FETCH};

/// Error pushing data to an export sink.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// Request could not be sent or timed out.
    #[error("http: {0}")]
    Http(String),

    /// Sink answered with a non-2xx status.
    #[error("sink rejected export with HTTP {0}")]
    Status(u16),
}

impl StatsError {
    /// Create an HTTP error from any error type.
    #[inline]
    pub fn http<E: std::fmt::Display>(err: E) -> Self {
        Self::Http(err.to_string())
    }

    /// Get the error type string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            StatsError::Http(_) => ERROR_REMOTE_FETCH,
            StatsError::Status(_) => ERROR_EXPORT,
        }
    }
}

/// Error returned to callers of the admin API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Shared secret missing or wrong.
    #[error("unauthorized")]
    Unauthorized,

    /// Request body could not be parsed.
    #[error("{0}")]
    MalformedRequest(String),
}

impl ApiError {
    /// Get the error type string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => ERROR_AUTHORIZATION,
            ApiError::MalformedRequest(_) => ERROR_MALFORMED_REQUEST,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
