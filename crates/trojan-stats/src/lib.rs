//! Per-user traffic accounting for trojan-rs.
//!
//! This crate provides:
//!
//! - [`TrafficLedger`]: byte counters, online session counts and pending kicks
//! - [`StatsApi`]: the admin HTTP surface over the ledger (`/traffic`, `/kick`, `/online`)
//! - [`TrafficPusher`] / [`StatusPusher`]: periodic export to a remote collector
//!
//! # Example
//!
//! ```
//! use trojan_stats::{TrafficEntry, TrafficLedger};
//!
//! let ledger = TrafficLedger::new();
//! assert!(ledger.record_traffic("u1", 100, 50));
//! assert!(ledger.record_traffic("u1", 10, 5));
//!
//! let totals = ledger.snapshot(false);
//! assert_eq!(totals["u1"], TrafficEntry::new(110, 55));
//! ```

mod api;
mod error;
mod export;
mod ledger;
mod system;

pub use api::StatsApi;
pub use error::{ApiError, StatsError};
pub use export::{StatusPusher, TrafficPushEntry, TrafficPusher, build_traffic_payload};
pub use ledger::{TrafficEntry, TrafficLedger};
pub use system::{SystemSampler, SystemStatus};
