//! Trojan node agent: serves the traffic stats API, keeps the user
//! directory in sync, pushes traffic and system status to the panel, and
//! restarts itself when the remote configuration changes.
//!
//! # Usage
//!
//! ```bash
//! trojan-rs agent -c config.toml
//! ```
//!
//! A proxy embedding the agent feeds connection events into
//! [`AgentHandles::ledger`] and authenticates through
//! [`AgentHandles::auth`].

pub mod cli;
pub mod error;
pub mod reporter;
pub mod runner;
pub mod watch;

pub use cli::AgentArgs;
pub use error::AgentError;
pub use runner::{AgentHandles, RunOutcome, run_with_shutdown};
pub use watch::ConfigWatcher;
