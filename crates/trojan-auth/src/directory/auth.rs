//! Credential lookup against the published directory snapshot.

use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;

use crate::error::AuthError;
use crate::result::AuthResult;
use crate::traits::AuthBackend;

use super::snapshot::DirectorySnapshot;

/// Authenticator backed by the current [`DirectorySnapshot`].
///
/// Uses `ArcSwap` for lock-free reads and atomic replacement: a lookup sees
/// either the old or the new snapshot in full, never a mix.
#[derive(Debug)]
pub struct DirectoryAuth {
    current: ArcSwap<DirectorySnapshot>,
}

impl DirectoryAuth {
    /// Create an authenticator with an empty snapshot.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(DirectorySnapshot::default()),
        }
    }

    /// Get the current snapshot.
    #[inline]
    pub fn current(&self) -> Arc<DirectorySnapshot> {
        self.current.load_full()
    }

    /// Replace the current snapshot, returning the one it replaced.
    pub fn publish(&self, snapshot: impl Into<Arc<DirectorySnapshot>>) -> Arc<DirectorySnapshot> {
        self.current.swap(snapshot.into())
    }

    /// Look up the user id for a credential.
    pub fn lookup(&self, credential: &str) -> Option<String> {
        self.current.load().get(credential).map(|u| u.id.clone())
    }

    /// Number of credentials in the current snapshot.
    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    /// Check if the current snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }
}

impl Default for DirectoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthBackend for DirectoryAuth {
    async fn verify(&self, credential: &str) -> Result<AuthResult, AuthError> {
        let snapshot = self.current.load();
        match snapshot.get(credential) {
            Some(user) => Ok(AuthResult::with_user_id(user.id.clone()).with_metadata(user.metadata())),
            None => Err(AuthError::Invalid),
        }
    }
}
