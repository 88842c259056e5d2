//! Default configuration values.
//!
//! Centralized default constants for use across all crates.

// ============================================================================
// Admin API Defaults
// ============================================================================

/// Default listen address of the traffic stats API.
pub const DEFAULT_STATS_LISTEN: &str = "127.0.0.1:7653";

// ============================================================================
// Interval Defaults
// ============================================================================

/// Default user directory polling interval in seconds.
pub const DEFAULT_DIRECTORY_INTERVAL_SECS: u64 = 60;
/// Default traffic export interval in seconds.
pub const DEFAULT_TRAFFIC_PUSH_INTERVAL_SECS: u64 = 60;
/// Default system status export interval in seconds.
pub const DEFAULT_STATUS_PUSH_INTERVAL_SECS: u64 = 60;
/// Default remote config polling interval in seconds.
pub const DEFAULT_CONFIG_WATCH_INTERVAL_SECS: u64 = 60;

// ============================================================================
// Timeout Defaults
// ============================================================================

/// Default timeout for a single outbound HTTP request in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
/// Default graceful shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Logging Defaults
// ============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Default log format.
pub const DEFAULT_LOG_FORMAT: &str = "pretty";
/// Default log output.
pub const DEFAULT_LOG_OUTPUT: &str = "stderr";
