//! Configuration file loading and error types.

use std::{fs, path::Path};

use crate::Config;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unsupported config format")]
    UnsupportedFormat,
    #[error("validation: {0}")]
    Validation(String),
}

pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)?;
    match path.extension().and_then(|s| s.to_str()).unwrap_or("") {
        "json" | "jsonc" => {
            let stripped = json_comments::StripComments::new(data.as_bytes());
            Ok(serde_json::from_reader(stripped)?)
        }
        "yaml" | "yml" => Ok(serde_yaml::from_str(&data)?),
        "toml" => Ok(toml::from_str(&data)?),
        _ => Err(ConfigError::UnsupportedFormat),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_toml() {
        let file = write_config(
            ".toml",
            r#"
[stats]
secret = "s3cret"

[directory]
url = "https://panel.example.com/api/users"
interval_secs = 30

[export]
traffic_url = "https://panel.example.com/api/traffic"

[logging]
level = "debug"
filters = { "trojan_auth" = "trace" }
"#,
        );
        let config = load_config(file.path()).unwrap();

        let stats = config.stats.unwrap();
        assert_eq!(stats.listen, trojan_core::DEFAULT_STATS_LISTEN);
        assert_eq!(stats.secret.as_deref(), Some("s3cret"));

        let directory = config.directory.unwrap();
        assert_eq!(directory.interval_secs, 30);
        assert_eq!(directory.timeout_secs, trojan_core::DEFAULT_HTTP_TIMEOUT_SECS);

        assert!(config.export.status_url.is_none());
        assert_eq!(
            config.export.traffic_interval_secs,
            trojan_core::DEFAULT_TRAFFIC_PUSH_INTERVAL_SECS
        );
        assert!(config.remote_config.is_none());
        assert_eq!(config.logging.filters["trojan_auth"], "trace");
    }

    #[test]
    fn load_jsonc_with_comments() {
        let file = write_config(
            ".jsonc",
            r#"{
                // admin api
                "stats": { "listen": "0.0.0.0:9000" },
                /* restart when the panel config changes */
                "remote_config": { "url": "http://127.0.0.1/config" }
            }"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.stats.unwrap().listen, "0.0.0.0:9000");
        assert_eq!(
            config.remote_config.unwrap().interval_secs,
            trojan_core::DEFAULT_CONFIG_WATCH_INTERVAL_SECS
        );
    }

    #[test]
    fn load_yaml() {
        let file = write_config(
            ".yml",
            "export:\n  status_url: http://127.0.0.1/status\n  status_interval_secs: 5\n",
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.export.status_interval_secs, 5);
        assert!(config.stats.is_none());
    }

    #[test]
    fn unsupported_extension() {
        let file = write_config(".ini", "[stats]");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::UnsupportedFormat)
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            load_config("/nonexistent/agent.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
