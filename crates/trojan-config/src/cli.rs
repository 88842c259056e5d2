//! CLI override definitions and application logic.

use clap::Parser;

use crate::Config;
use crate::types::*;

#[derive(Debug, Clone, Parser, Default)]
pub struct CliOverrides {
    /// Override stats API listen address, e.g. 127.0.0.1:7653
    #[arg(long)]
    pub stats_listen: Option<String>,
    /// Override stats API shared secret
    #[arg(long)]
    pub stats_secret: Option<String>,
    /// Override user directory URL
    #[arg(long)]
    pub directory_url: Option<String>,
    /// Override user directory polling interval (seconds)
    #[arg(long)]
    pub directory_interval_secs: Option<u64>,
    /// Override traffic export URL
    #[arg(long)]
    pub traffic_url: Option<String>,
    /// Override system status export URL
    #[arg(long)]
    pub status_url: Option<String>,
    /// Override log level (trace/debug/info/warn/error)
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) {
    if let Some(v) = &overrides.stats_listen {
        config.stats.get_or_insert_with(StatsConfig::default).listen = v.clone();
    }
    if let Some(v) = &overrides.stats_secret {
        config.stats.get_or_insert_with(StatsConfig::default).secret = Some(v.clone());
    }
    if let Some(v) = &overrides.directory_url {
        match config.directory {
            Some(ref mut dir) => dir.url = v.clone(),
            None => config.directory = Some(DirectoryConfig::new(v.clone())),
        }
    }
    if let Some(secs) = overrides.directory_interval_secs
        && let Some(ref mut dir) = config.directory
    {
        dir.interval_secs = secs;
    }
    if let Some(v) = &overrides.traffic_url {
        config.export.traffic_url = Some(v.clone());
    }
    if let Some(v) = &overrides.status_url {
        config.export.status_url = Some(v.clone());
    }
    if let Some(v) = &overrides.log_level {
        config.logging.level = Some(v.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_create_missing_sections() {
        let overrides = CliOverrides::parse_from([
            "agent",
            "--stats-secret",
            "s3cret",
            "--directory-url",
            "https://panel/users",
            "--directory-interval-secs",
            "15",
            "--log-level",
            "debug",
        ]);
        let mut config = Config::default();
        apply_overrides(&mut config, &overrides);

        let stats = config.stats.unwrap();
        assert_eq!(stats.listen, trojan_core::DEFAULT_STATS_LISTEN);
        assert_eq!(stats.secret.as_deref(), Some("s3cret"));
        let dir = config.directory.unwrap();
        assert_eq!(dir.url, "https://panel/users");
        assert_eq!(dir.interval_secs, 15);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
    }

    #[test]
    fn overrides_replace_existing_values() {
        let mut config = Config::default();
        config.directory = Some(DirectoryConfig {
            url: "https://old/users".into(),
            interval_secs: 60,
            timeout_secs: 3,
        });
        config.export.traffic_url = Some("https://old/traffic".into());

        let overrides = CliOverrides {
            directory_url: Some("https://new/users".into()),
            traffic_url: Some("https://new/traffic".into()),
            status_url: Some("https://new/status".into()),
            ..Default::default()
        };
        apply_overrides(&mut config, &overrides);

        let dir = config.directory.unwrap();
        assert_eq!(dir.url, "https://new/users");
        assert_eq!(dir.timeout_secs, 3);
        assert_eq!(config.export.traffic_url.as_deref(), Some("https://new/traffic"));
        assert_eq!(config.export.status_url.as_deref(), Some("https://new/status"));
        assert!(config.stats.is_none());
    }
}
