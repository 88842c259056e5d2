//! Configuration validation logic.

use crate::Config;
use crate::loader::ConfigError;

const LOG_FORMATS: [&str; 3] = ["json", "pretty", "compact"];
const LOG_OUTPUTS: [&str; 2] = ["stdout", "stderr"];

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if let Some(ref stats) = config.stats {
        if stats.listen.trim().is_empty() {
            return Err(ConfigError::Validation("stats.listen is empty".into()));
        }
        if stats.secret.as_deref() == Some("") {
            return Err(ConfigError::Validation(
                "stats.secret is empty (omit it to disable the check)".into(),
            ));
        }
    }
    if let Some(ref dir) = config.directory {
        check_url("directory.url", &dir.url)?;
        check_positive("directory.interval_secs", dir.interval_secs)?;
        check_positive("directory.timeout_secs", dir.timeout_secs)?;
    }
    let export = &config.export;
    if let Some(ref url) = export.traffic_url {
        check_url("export.traffic_url", url)?;
    }
    if let Some(ref url) = export.status_url {
        check_url("export.status_url", url)?;
    }
    check_positive("export.traffic_interval_secs", export.traffic_interval_secs)?;
    check_positive("export.status_interval_secs", export.status_interval_secs)?;
    check_positive("export.timeout_secs", export.timeout_secs)?;
    if let Some(ref watch) = config.remote_config {
        check_url("remote_config.url", &watch.url)?;
        check_positive("remote_config.interval_secs", watch.interval_secs)?;
        check_positive("remote_config.timeout_secs", watch.timeout_secs)?;
    }
    check_positive("shutdown_timeout_secs", config.shutdown_timeout_secs)?;
    if let Some(ref format) = config.logging.format
        && !LOG_FORMATS.contains(&format.as_str())
    {
        return Err(ConfigError::Validation(format!(
            "logging.format must be one of: {:?}",
            LOG_FORMATS
        )));
    }
    if let Some(ref output) = config.logging.output
        && !LOG_OUTPUTS.contains(&output.as_str())
    {
        return Err(ConfigError::Validation(format!(
            "logging.output must be one of: {:?}",
            LOG_OUTPUTS
        )));
    }
    Ok(())
}

fn check_url(field: &str, url: &str) -> Result<(), ConfigError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ConfigError::Validation(format!("{field} is empty")));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

fn check_positive(field: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!("{field} must be > 0")));
    }
    Ok(())
}
