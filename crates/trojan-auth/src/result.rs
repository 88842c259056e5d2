//! Authentication result types.

/// Result of a successful authentication.
#[derive(Debug, Clone, Default)]
pub struct AuthResult {
    /// Optional user identifier for logging/accounting.
    pub user_id: Option<String>,

    /// Optional user metadata.
    pub metadata: Option<AuthMetadata>,
}

impl AuthResult {
    /// Create a new auth result with a user ID.
    #[inline]
    pub fn with_user_id(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            metadata: None,
        }
    }

    /// Add metadata to the result.
    #[inline]
    pub fn with_metadata(mut self, metadata: AuthMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Per-user limits published by the directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthMetadata {
    /// Maximum concurrent devices (0 = unlimited).
    pub device_limit: i64,

    /// Speed limit as published by the directory (0 = unlimited).
    pub speed_limit: i64,
}
