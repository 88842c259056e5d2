//! Configuration type definitions for the stats API, directory sync, export
//! sinks, remote config watching and logging.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::defaults::*;

/// Top-level agent configuration. Every section is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Admin stats API; absent disables it.
    #[serde(default)]
    pub stats: Option<StatsConfig>,
    /// Remote user directory; absent disables directory sync.
    #[serde(default)]
    pub directory: Option<DirectoryConfig>,
    /// Traffic and status export sinks.
    #[serde(default)]
    pub export: ExportConfig,
    /// Remote config change watcher; absent disables it.
    #[serde(default)]
    pub remote_config: Option<RemoteConfigWatch>,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// How long to wait for background tasks to stop.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stats: None,
            directory: None,
            export: ExportConfig::default(),
            remote_config: None,
            logging: LoggingConfig::default(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

/// Admin stats API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Admin API listen address. Default: 127.0.0.1:7653
    #[serde(default = "default_stats_listen")]
    pub listen: String,
    /// Shared secret expected verbatim in the `Authorization` header.
    #[serde(default)]
    pub secret: Option<String>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            listen: default_stats_listen(),
            secret: None,
        }
    }
}

/// Remote user directory polled with conditional requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// User directory endpoint (http or https).
    pub url: String,
    /// Polling interval in seconds. The first poll runs at startup.
    #[serde(default = "default_directory_interval_secs")]
    pub interval_secs: u64,
    /// Per-request timeout.
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

impl DirectoryConfig {
    /// Directory section for `url` with default interval and timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            interval_secs: default_directory_interval_secs(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

/// Periodic pushes to the panel. A sink without a URL is disabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Collector for per-user traffic totals.
    #[serde(default)]
    pub traffic_url: Option<String>,
    #[serde(default = "default_traffic_interval_secs")]
    pub traffic_interval_secs: u64,
    /// Collector for host status samples.
    #[serde(default)]
    pub status_url: Option<String>,
    #[serde(default = "default_status_interval_secs")]
    pub status_interval_secs: u64,
    /// Per-request timeout shared by both sinks.
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            traffic_url: None,
            traffic_interval_secs: default_traffic_interval_secs(),
            status_url: None,
            status_interval_secs: default_status_interval_secs(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

/// Endpoint whose `ETag` is watched; a change triggers a restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfigWatch {
    /// Remote configuration document (http or https).
    pub url: String,
    /// Polling interval in seconds.
    #[serde(default = "default_watch_interval_secs")]
    pub interval_secs: u64,
    /// Per-request timeout.
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: Option<String>,
    /// Log format: json, pretty, or compact. Default: pretty.
    pub format: Option<String>,
    /// Output target: stdout or stderr. Default: stderr.
    pub output: Option<String>,
    /// Per-module log level filters (e.g., {"trojan_auth": "debug", "reqwest": "warn"}).
    #[serde(default)]
    pub filters: HashMap<String, String>,
}
