//! Remote user directory.
//!
//! This module provides:
//!
//! - [`UserRecord`] / [`DirectorySnapshot`]: an immutable, versioned set of users
//! - [`DirectoryAuth`]: lock-free credential lookup against the published snapshot
//! - [`DirectorySource`]: fetch trait, with [`HttpDirectorySource`] doing
//!   conditional GETs keyed on the entity tag
//! - [`DirectorySync`]: the polling loop that replaces the snapshot and
//!   reports removed users

mod auth;
mod snapshot;
mod source;
mod sync;

pub use auth::DirectoryAuth;
pub use snapshot::{DirectorySnapshot, UserRecord, parse_users};
pub use source::{DirectorySource, FetchOutcome, HttpDirectorySource};
pub use sync::{DirectorySync, SyncOutcome};
