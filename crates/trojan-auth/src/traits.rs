//! Authentication backend trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AuthError;
use crate::result::AuthResult;

/// Trait for authentication backends.
///
/// Implementations must be thread-safe (`Send + Sync`) as they may be
/// called concurrently from multiple connections.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Verify a credential presented by a connecting client.
    ///
    /// # Returns
    /// * `Ok(AuthResult)` - Authentication successful
    /// * `Err(AuthError)` - Authentication failed
    async fn verify(&self, credential: &str) -> Result<AuthResult, AuthError>;
}

/// Blanket implementation for `Arc<A>` where `A: AuthBackend`.
///
/// This allows passing `Arc<AuthBackend>` directly to functions expecting `impl AuthBackend`.
#[async_trait]
impl<A: AuthBackend + ?Sized> AuthBackend for Arc<A> {
    #[inline]
    async fn verify(&self, credential: &str) -> Result<AuthResult, AuthError> {
        (**self).verify(credential).await
    }
}

/// Blanket implementation for `Box<A>` where `A: AuthBackend`.
#[async_trait]
impl<A: AuthBackend + ?Sized> AuthBackend for Box<A> {
    #[inline]
    async fn verify(&self, credential: &str) -> Result<AuthResult, AuthError> {
        (**self).verify(credential).await
    }
}
