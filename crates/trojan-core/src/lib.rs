//! Core types and constants shared across trojan crates.
//!
//! This crate provides:
//! - Default configuration values
//! - Error type constants for logging
//! - The [`TrafficLogger`] hook a proxy calls on connection events
//! - Common project metadata

pub mod defaults;
pub mod errors;
pub mod traffic;

// Re-export commonly used items at crate root
pub use defaults::*;
pub use errors::*;
pub use traffic::TrafficLogger;

/// Project version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
