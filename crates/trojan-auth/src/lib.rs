//! Authentication backends for trojan.
//!
//! Users are looked up in a [`DirectorySnapshot`] that [`DirectorySync`]
//! keeps in step with a remote user directory. When users disappear from
//! the directory their online sessions are closed through the
//! [`TrafficLogger`](trojan_core::TrafficLogger) hook.
//!
//! # Example
//!
//! ```
//! use trojan_auth::{AuthBackend, DirectoryAuth, DirectorySnapshot, UserRecord};
//!
//! # async fn example() -> Result<(), trojan_auth::AuthError> {
//! let auth = DirectoryAuth::new();
//! auth.publish(DirectorySnapshot::new(
//!     [UserRecord::new("1", "8d2c-credential")],
//!     Some("\"v1\"".into()),
//! ));
//!
//! assert_eq!(auth.lookup("8d2c-credential").as_deref(), Some("1"));
//! let result = auth.verify("8d2c-credential").await?;
//! assert_eq!(result.user_id.as_deref(), Some("1"));
//! # Ok(())
//! # }
//! ```

pub mod directory;
mod error;
mod result;
mod traits;

pub use directory::{
    DirectoryAuth, DirectorySnapshot, DirectorySource, DirectorySync, FetchOutcome,
    HttpDirectorySource, SyncOutcome, UserRecord, parse_users,
};
pub use error::{AuthError, DirectoryError};
pub use result::{AuthMetadata, AuthResult};
pub use traits::AuthBackend;
