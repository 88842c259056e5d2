//! # trojan-rs
//!
//! Per-user traffic accounting and remote user directory sync for
//! trojan-style proxy nodes.
//!
//! ## Crates
//!
//! - [`trojan_core`] - Shared defaults, error kinds and the traffic hook trait
//! - [`trojan_config`] - Configuration loading and validation
//! - [`trojan_auth`] - Directory snapshot, sync loop and authenticator
//! - [`trojan_stats`] - Traffic ledger, admin API and export sinks
//! - [`trojan_agent`] - Runtime wiring and CLI

pub use trojan_agent as agent;
pub use trojan_auth as auth;
pub use trojan_config as config;
pub use trojan_core as core;
pub use trojan_stats as stats;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use trojan_agent::{AgentHandles, RunOutcome, run_with_shutdown};
    pub use trojan_auth::{AuthBackend, DirectoryAuth, DirectorySync, HttpDirectorySource};
    pub use trojan_config::{Config, load_config, validate_config};
    pub use trojan_core::TrafficLogger;
    pub use trojan_stats::{StatsApi, TrafficLedger};
}
