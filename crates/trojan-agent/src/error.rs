//! Agent error types.

use trojan_config::ConfigError;

/// Agent error type.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("http: {0}")]
    Http(String),
}

impl AgentError {
    /// Create an HTTP error from any error type.
    #[inline]
    pub fn http<E: std::fmt::Display>(err: E) -> Self {
        Self::Http(err.to_string())
    }
}
